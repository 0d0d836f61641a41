//! Fixture Directory.
//!
//! Maps a team name to its upcoming fixtures. The mapping is built ahead of
//! time by an ingest job and only read here.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::entities::FixtureId;

/// A match that still counts as "next" this long after kickoff.
const IN_PROGRESS_GRACE: time::Duration = time::Duration::hours(4);

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read fixture directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse fixture directory: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("fixture {fixture_id} of {team} has an invalid date {date:?}")]
    InvalidDate {
        team: String,
        fixture_id: FixtureId,
        date: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledFixture {
    pub fixture_id: FixtureId,
    pub kickoff: OffsetDateTime,
}

pub trait FixtureDirectory: Send + Sync {
    /// Earliest fixture of `team` that has not kicked off more than a few
    /// hours before `now`.
    fn next_fixture(&self, team: &str, now: OffsetDateTime) -> Option<ScheduledFixture>;

    /// Every team the directory knows, sorted.
    fn teams(&self) -> Vec<String>;

    fn knows(&self, team: &str) -> bool {
        self.teams()
            .iter()
            .any(|known| known.to_lowercase() == team.to_lowercase())
    }
}

/// Kickoff as `DD/MM/YYYY @ HH:MM`. Fixtures whose time is not fixed yet
/// are scheduled at midnight and read `DD/MM/YYYY @ Not Determined`.
pub fn schedule_label(kickoff: OffsetDateTime) -> String {
    const DATE: &[time::format_description::FormatItem<'static>] =
        time::macros::format_description!("[day]/[month]/[year]");
    const TIME: &[time::format_description::FormatItem<'static>] =
        time::macros::format_description!("[hour]:[minute]");

    let date = kickoff.format(DATE).unwrap_or_else(|_| kickoff.date().to_string());
    let time = if kickoff.hour() == 0 && kickoff.minute() == 0 {
        "Not Determined".to_string()
    } else {
        kickoff.format(TIME).unwrap_or_else(|_| kickoff.time().to_string())
    };
    format!("{date} @ {time}")
}

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    fixture_id: u64,
    date: String,
}

/// Directory loaded from a JSON document of the form
/// `{"Arsenal": [{"fixture_id": 1, "date": "2024-08-17T14:00:00+00:00"}]}`.
///
/// Team names match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct JsonFixtureDirectory {
    /// Lowercased team name to (display name, fixtures sorted by kickoff).
    teams: HashMap<String, (String, Vec<ScheduledFixture>)>,
}

impl JsonFixtureDirectory {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let body = tokio::fs::read(path).await?;
        Self::from_slice(&body)
    }

    pub fn from_slice(body: &[u8]) -> Result<Self, DirectoryError> {
        let raw: HashMap<String, Vec<FixtureEntry>> = serde_json::from_slice(body)?;

        let mut teams = HashMap::with_capacity(raw.len());
        for (team, entries) in raw {
            let mut fixtures = entries
                .into_iter()
                .map(|entry| {
                    let fixture_id = FixtureId(entry.fixture_id);
                    OffsetDateTime::parse(&entry.date, &Rfc3339)
                        .map(|kickoff| ScheduledFixture {
                            fixture_id,
                            kickoff,
                        })
                        .map_err(|_| DirectoryError::InvalidDate {
                            team: team.clone(),
                            fixture_id,
                            date: entry.date,
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            fixtures.sort_by_key(|fixture| fixture.kickoff);
            teams.insert(team.to_lowercase(), (team, fixtures));
        }

        Ok(Self { teams })
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl FixtureDirectory for JsonFixtureDirectory {
    fn next_fixture(&self, team: &str, now: OffsetDateTime) -> Option<ScheduledFixture> {
        let (_, fixtures) = self.teams.get(&team.to_lowercase())?;
        let cutoff = now - IN_PROGRESS_GRACE;
        fixtures
            .iter()
            .find(|fixture| fixture.kickoff >= cutoff)
            .copied()
    }

    fn knows(&self, team: &str) -> bool {
        self.teams.contains_key(&team.to_lowercase())
    }

    fn teams(&self) -> Vec<String> {
        let mut names: Vec<String> = self.teams.values().map(|(name, _)| name.clone()).collect();
        names.sort();
        names
    }
}
