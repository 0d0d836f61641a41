//! Models of the football data provider's `/fixtures` endpoint.
//!
//! Only the parts the live tracker reads are modelled. Everything else in
//! the payload (lineups, players, venue, ...) is ignored on deserialization
//! and stays available through the raw JSON kept by the caller.
//!
//! Counters are `Option` because the provider sends `null` for goals and
//! scores until the match has started.

use serde::{Deserialize, Serialize};

/// Envelope returned by `GET /fixtures?id=...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureResponse {
    /// Provider-side errors. An empty array or an empty object when the
    /// call succeeded.
    #[serde(default)]
    pub errors: serde_json::Value,
    #[serde(default)]
    pub results: u32,
    pub response: Vec<FixtureItem>,
}

impl FixtureResponse {
    /// Whether the provider reported any error in the `errors` field.
    pub fn has_errors(&self) -> bool {
        match &self.errors {
            serde_json::Value::Array(items) => !items.is_empty(),
            serde_json::Value::Object(map) => !map.is_empty(),
            serde_json::Value::Null => false,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureItem {
    pub fixture: FixtureInfo,
    pub league: LeagueInfo,
    pub teams: Teams,
    pub goals: Goals,
    pub score: Score,
    #[serde(default)]
    pub events: Option<Vec<EventItem>>,
    #[serde(default)]
    pub statistics: Option<Vec<TeamStatistics>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureInfo {
    pub id: u64,
    /// Kickoff in ISO-8601 with offset, e.g. `2024-08-17T17:30:00+01:00`.
    pub date: String,
    pub status: FixtureStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureStatus {
    #[serde(default)]
    pub long: Option<String>,
    /// Short status code (`NS`, `1H`, `HT`, `FT`, ...).
    #[serde(default)]
    pub short: Option<String>,
    /// Minutes played, `null` before kickoff.
    #[serde(default)]
    pub elapsed: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueInfo {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teams {
    pub home: TeamRef,
    pub away: TeamRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub halftime: Goals,
    #[serde(default)]
    pub fulltime: Goals,
    #[serde(default)]
    pub extratime: Goals,
    #[serde(default)]
    pub penalty: Goals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventItem {
    pub time: EventTime,
    pub team: TeamRef,
    #[serde(default)]
    pub player: PlayerRef,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EventTime {
    pub elapsed: u32,
    #[serde(default)]
    pub extra: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerRef {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Statistics block of one team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub team: TeamRef,
    #[serde(default)]
    pub statistics: Vec<StatEntry>,
}

/// One statistic. The value is `null`, an integer, or a percentage string
/// such as `"55%"` depending on the statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub value: serde_json::Value,
}
