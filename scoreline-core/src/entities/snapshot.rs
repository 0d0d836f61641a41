//! Point-in-time reads of a fixture.

use scoreline_sdk::objects::TeamRef;
use time::OffsetDateTime;

use super::{FixtureId, MatchEvent, Phase, StatusCode};

/// One team's side of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamLine {
    pub name: String,
    pub logo: Option<String>,
    pub goals: u32,
    pub halftime_goals: u32,
    pub shots_on_goal: u32,
    pub corner_kicks: u32,
    /// Percentage, 0-100.
    pub ball_possession: u32,
    /// Every statistic the provider sent for this team as (type, value),
    /// in provider order.
    pub stats: Vec<(String, serde_json::Value)>,
}

impl TeamLine {
    /// A team line with every counter at zero.
    pub fn zeroed(team: &TeamRef) -> Self {
        Self {
            name: team.name.clone(),
            logo: team.logo.clone(),
            goals: 0,
            halftime_goals: 0,
            shots_on_goal: 0,
            corner_kicks: 0,
            ball_possession: 0,
            stats: Vec::new(),
        }
    }

    /// Raw value of the statistic `kind`, if the provider sent it.
    pub fn stat(&self, kind: &str) -> Option<&serde_json::Value> {
        self.stats
            .iter()
            .find(|(name, _)| name == kind)
            .map(|(_, value)| value)
    }
}

/// Immutable read of a fixture, produced once per poll.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSnapshot {
    pub fixture_id: FixtureId,
    pub started: bool,
    pub status: StatusCode,
    pub phase: Phase,
    pub elapsed_minutes: Option<u32>,
    pub kickoff: OffsetDateTime,
    /// Kickoff for humans, e.g. `August 17, 2024, 17:30`.
    pub kickoff_label: String,
    pub league_name: String,
    pub league_logo: Option<String>,
    pub home: TeamLine,
    pub away: TeamLine,
    /// Shootout tally as (home, away); zero outside a shootout.
    pub penalty_scores: (u32, u32),
    /// Name of the team that scored the first counting goal.
    pub first_scorer: Option<String>,
    pub events: Vec<MatchEvent>,
    /// The provider payload this snapshot was parsed from.
    pub raw: serde_json::Value,
}

impl MatchSnapshot {
    /// `"{home} vs {away}"`, the name a tracking task is registered under.
    pub fn display_name(&self) -> String {
        format!("{} vs {}", self.home.name, self.away.name)
    }

    /// Current result as `(home, away)` goals.
    pub fn result(&self) -> (u32, u32) {
        (self.home.goals, self.away.goals)
    }
}

/// Result of one successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The match has no elapsed time yet. Counters are zero.
    NotStarted(MatchSnapshot),
    Live(MatchSnapshot),
}

impl FetchOutcome {
    pub fn snapshot(&self) -> &MatchSnapshot {
        match self {
            FetchOutcome::NotStarted(snapshot) | FetchOutcome::Live(snapshot) => snapshot,
        }
    }

    pub fn into_snapshot(self) -> MatchSnapshot {
        match self {
            FetchOutcome::NotStarted(snapshot) | FetchOutcome::Live(snapshot) => snapshot,
        }
    }
}
