//! Snapshot Fetcher.
//!
//! Wraps one call to the data provider and normalizes its payload into a
//! [`FetchOutcome`]. A payload without an elapsed time is a match that has
//! not kicked off yet; it yields a zeroed snapshot. A payload with an
//! elapsed time is parsed in full.
//!
//! The fetcher never retries. A failed fetch is reported as a
//! [`ProviderError`] and the caller decides when to try again.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use scoreline_sdk::objects::{FixtureItem, FixtureResponse, Goals, StatEntry, TeamStatistics};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, warn};

use crate::entities::{
    FetchOutcome, FixtureId, MatchEvent, MatchSnapshot, Phase, StatusCode, TeamLine,
};

/// Errors that can occur while fetching a snapshot.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider could not be reached or timed out.
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider answered with an error status or an `errors` entry.
    #[error("provider returned an error: {0}")]
    Api(String),

    /// The payload is missing required fields.
    #[error("malformed provider payload: {0}")]
    Malformed(String),

    /// The provider has no fixture with this id.
    #[error("fixture {0} not found")]
    NotFound(FixtureId),
}

/// Source of raw fixture documents.
///
/// Implementations perform the network call; parsing stays in
/// [`SnapshotFetcher`] so every provider is held to the same contract.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn fixture(&self, fixture_id: FixtureId) -> Result<serde_json::Value, ProviderError>;
}

/// Turns provider documents into typed snapshots.
#[derive(Clone)]
pub struct SnapshotFetcher {
    provider: Arc<dyn DataProvider>,
    dump_dir: Option<PathBuf>,
}

impl SnapshotFetcher {
    pub fn new(provider: Arc<dyn DataProvider>) -> Self {
        Self {
            provider,
            dump_dir: None,
        }
    }

    /// Write every fetched payload to `{dir}/{home}vs{away}.json`.
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = Some(dir.into());
        self
    }

    pub async fn fetch(&self, fixture_id: FixtureId) -> Result<FetchOutcome, ProviderError> {
        let raw = self.provider.fixture(fixture_id).await?;
        let outcome = parse_fixture(fixture_id, raw)?;

        debug!(
            %fixture_id,
            status = %outcome.snapshot().status,
            elapsed = ?outcome.snapshot().elapsed_minutes,
            events = outcome.snapshot().events.len(),
            "Fetched snapshot"
        );

        if let Some(dir) = &self.dump_dir {
            dump_payload(dir, outcome.snapshot()).await;
        }

        Ok(outcome)
    }
}

/// Parse one `/fixtures` document.
pub fn parse_fixture(
    fixture_id: FixtureId,
    raw: serde_json::Value,
) -> Result<FetchOutcome, ProviderError> {
    let response: FixtureResponse = serde_json::from_value(raw.clone())
        .map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if response.has_errors() {
        return Err(ProviderError::Api(response.errors.to_string()));
    }

    let Some(item) = response.response.into_iter().next() else {
        return Err(ProviderError::NotFound(fixture_id));
    };

    let kickoff = OffsetDateTime::parse(&item.fixture.date, &Rfc3339).map_err(|e| {
        ProviderError::Malformed(format!("fixture date {:?}: {e}", item.fixture.date))
    })?;

    match item.fixture.status.elapsed {
        None => Ok(FetchOutcome::NotStarted(not_started(fixture_id, item, kickoff, raw))),
        Some(elapsed) => live(fixture_id, item, kickoff, elapsed, raw).map(FetchOutcome::Live),
    }
}

fn not_started(
    fixture_id: FixtureId,
    item: FixtureItem,
    kickoff: OffsetDateTime,
    raw: serde_json::Value,
) -> MatchSnapshot {
    let status = item
        .fixture
        .status
        .short
        .as_deref()
        .map_or(StatusCode::NotStarted, StatusCode::parse);

    MatchSnapshot {
        fixture_id,
        started: false,
        status,
        phase: Phase::PreMatch,
        elapsed_minutes: None,
        kickoff,
        kickoff_label: kickoff_label(kickoff),
        league_name: item.league.name,
        league_logo: item.league.logo,
        home: TeamLine::zeroed(&item.teams.home),
        away: TeamLine::zeroed(&item.teams.away),
        penalty_scores: (0, 0),
        first_scorer: None,
        events: Vec::new(),
        raw,
    }
}

fn live(
    fixture_id: FixtureId,
    item: FixtureItem,
    kickoff: OffsetDateTime,
    elapsed: u32,
    raw: serde_json::Value,
) -> Result<MatchSnapshot, ProviderError> {
    let Some(statistics) = item.statistics else {
        return Err(ProviderError::Malformed(
            "live fixture without statistics array".to_string(),
        ));
    };

    let status = item
        .fixture
        .status
        .short
        .as_deref()
        .map_or(StatusCode::Live, StatusCode::parse);

    let events: Vec<MatchEvent> = item
        .events
        .unwrap_or_default()
        .into_iter()
        .map(MatchEvent::from)
        .collect();

    let first_scorer = events
        .iter()
        .find(|event| event.is_scoring_goal())
        .map(|event| event.team.name.clone());

    let mut home = TeamLine::zeroed(&item.teams.home);
    let mut away = TeamLine::zeroed(&item.teams.away);
    for block in &statistics {
        if block.team.name == home.name {
            apply_statistics(&mut home, block);
        } else if block.team.name == away.name {
            apply_statistics(&mut away, block);
        }
    }
    home.goals = item.goals.home.unwrap_or(0);
    away.goals = item.goals.away.unwrap_or(0);
    home.halftime_goals = item.score.halftime.home.unwrap_or(0);
    away.halftime_goals = item.score.halftime.away.unwrap_or(0);

    Ok(MatchSnapshot {
        fixture_id,
        started: true,
        phase: status.phase(),
        status,
        elapsed_minutes: Some(elapsed),
        kickoff,
        kickoff_label: kickoff_label(kickoff),
        league_name: item.league.name,
        league_logo: item.league.logo,
        home,
        away,
        penalty_scores: zeroed_pair(item.score.penalty),
        first_scorer,
        events,
        raw,
    })
}

fn apply_statistics(line: &mut TeamLine, block: &TeamStatistics) {
    for StatEntry { kind, value } in &block.statistics {
        match kind.as_str() {
            "Shots on Goal" => line.shots_on_goal = stat_count(value),
            "Corner Kicks" => line.corner_kicks = stat_count(value),
            "Ball Possession" => line.ball_possession = stat_count(value),
            _ => {}
        }
        line.stats.push((kind.clone(), value.clone()));
    }
}

/// Read a statistic as a count. `null`, missing and unparsable values are 0;
/// percentages lose their trailing `%`.
fn stat_count(value: &serde_json::Value) -> u32 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn zeroed_pair(goals: Goals) -> (u32, u32) {
    (goals.home.unwrap_or(0), goals.away.unwrap_or(0))
}

/// `August 17, 2024, 17:30`, in the offset the provider sent.
pub fn kickoff_label(kickoff: OffsetDateTime) -> String {
    const FORMAT: &[time::format_description::FormatItem<'static>] =
        time::macros::format_description!("[month repr:long] [day], [year], [hour]:[minute]");
    kickoff
        .format(FORMAT)
        .unwrap_or_else(|_| kickoff.to_string())
}

async fn dump_payload(dir: &std::path::Path, snapshot: &MatchSnapshot) {
    let file_name = format!("{}vs{}.json", snapshot.home.name, snapshot.away.name)
        .replace(['/', '\\'], "_");
    let path = dir.join(file_name);

    let body = match serde_json::to_vec_pretty(&snapshot.raw) {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "Failed to serialize snapshot payload");
            return;
        }
    };

    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        warn!(dir = %dir.display(), error = %e, "Failed to create snapshot dump directory");
        return;
    }
    if let Err(e) = tokio::fs::write(&path, body).await {
        warn!(path = %path.display(), error = %e, "Failed to write snapshot dump");
    }
}
