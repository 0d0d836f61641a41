//! Match Lifecycle processor.
//!
//! One `MatchLifecycle` runs per tracking task. Each iteration it:
//! - Fetches a fresh snapshot
//! - Derives phase moments through the [`PhaseTracker`]
//! - Announces opening moments, then newly seen notable events, then
//!   closing moments, to the announcement channel
//! - Updates the tracked message through the [`UpdateDispatcher`]
//! - Sleeps until the next poll, observing cancellation while it waits
//!
//! Before kickoff the sleep follows [`kickoff_poll_interval`] and counts
//! against the pre-match budget. Once the budget is spent without a start
//! the task exits silently. Every exit path unregisters the task from the
//! [`TaskRegistry`] exactly once.

use std::sync::Arc;
use std::time::Duration;

use scoreline_sdk::objects::WebhookMessage;
use time::OffsetDateTime;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::dedup::SeenEvents;
use crate::entities::{FixtureId, MatchSnapshot, Phase, StatusCode, UserId};
use crate::events::{ExitReason, PhaseMoment, TaskFinished, TaskFinishedSender};
use crate::fetcher::SnapshotFetcher;
use crate::processors::dispatcher::{DispatchOutcome, UpdateDispatcher};
use crate::registry::TaskRegistry;
use crate::render::Renderer;
use crate::sink::{ChannelId, MessageHandle, NotificationSink};
use crate::utils::poll_interval::kickoff_poll_interval;

// ---------------------------------------------------------------------------
// Phase tracking
// ---------------------------------------------------------------------------

/// Tracks the phase of one match and reports the boundaries it crosses.
///
/// Phases only move forward, except that a break may be followed by more
/// play. A status that would move the match back to pre-match is ignored
/// and `Finished` is terminal.
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    phase: Option<Phase>,
    /// Status that opened the current break (`HT` or `BT`).
    break_status: Option<StatusCode>,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed phase, `None` before the first snapshot.
    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// Feed the status of a new snapshot. Returns the moments crossed since
    /// the previous one, in the order they happened.
    pub fn advance(&mut self, status: &StatusCode, phase: Phase) -> Vec<PhaseMoment> {
        use Phase::*;

        let moments = match (self.phase, phase) {
            (Some(Finished), _) => return Vec::new(),
            (Some(_), PreMatch) => return Vec::new(),

            (None, PreMatch) | (None, InProgress) => Vec::new(),
            (None, HalfBreak) => vec![break_reached(status)],
            (None, Finished) => vec![PhaseMoment::GameEnded],

            (Some(PreMatch), InProgress) => vec![PhaseMoment::GameStarted],
            (Some(PreMatch), HalfBreak) => vec![PhaseMoment::GameStarted, break_reached(status)],
            (Some(PreMatch), Finished) => vec![PhaseMoment::GameStarted, PhaseMoment::GameEnded],

            (Some(InProgress), InProgress) => Vec::new(),
            (Some(InProgress), HalfBreak) => vec![break_reached(status)],
            (Some(InProgress), Finished) | (Some(HalfBreak), Finished) => {
                vec![PhaseMoment::GameEnded]
            }

            (Some(HalfBreak), InProgress) => play_resumed(status).into_iter().collect(),
            (Some(HalfBreak), HalfBreak) => {
                if self.break_status.as_ref() == Some(status) {
                    Vec::new()
                } else {
                    vec![break_reached(status)]
                }
            }
        };

        self.break_status = (phase == HalfBreak).then(|| status.clone());
        self.phase = Some(phase);
        moments
    }
}

fn break_reached(status: &StatusCode) -> PhaseMoment {
    match status {
        StatusCode::BreakTime => PhaseMoment::BreakTimeReached,
        _ => PhaseMoment::HalftimeReached,
    }
}

fn play_resumed(status: &StatusCode) -> Option<PhaseMoment> {
    match status {
        StatusCode::SecondHalf => Some(PhaseMoment::SecondHalfStarted),
        StatusCode::ExtraTime => Some(PhaseMoment::ExtraTimeStarted),
        StatusCode::Penalties => Some(PhaseMoment::PenaltyStarted),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tracking task
// ---------------------------------------------------------------------------

/// Identity of one tracking task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingTask {
    pub task_id: Uuid,
    pub user_id: UserId,
    pub fixture_id: FixtureId,
    /// Name the task is registered under, `"{home} vs {away}"`.
    pub name: String,
}

/// Collaborators shared by every tracking task.
#[derive(Clone)]
pub struct TrackingContext {
    pub fetcher: SnapshotFetcher,
    pub sink: Arc<dyn NotificationSink>,
    pub renderer: Renderer,
    pub registry: TaskRegistry,
    pub config: MonitorConfig,
    /// Notified once when the task returns.
    pub finished_tx: Option<TaskFinishedSender>,
}

pub struct MatchLifecycle {
    task: TrackingTask,
    ctx: TrackingContext,
    dispatcher: UpdateDispatcher,
    tracked: MessageHandle,
    announcements: Option<ChannelId>,
    latest_tx: Option<watch::Sender<MatchSnapshot>>,
}

impl MatchLifecycle {
    /// Create a lifecycle for a task that is already registered and whose
    /// tracked message was already sent.
    pub fn new(
        task: TrackingTask,
        ctx: TrackingContext,
        tracked: MessageHandle,
        announcements: Option<ChannelId>,
    ) -> Self {
        let dispatcher = UpdateDispatcher::new(ctx.config.dispatch_attempts);
        Self {
            task,
            ctx,
            dispatcher,
            tracked,
            announcements,
            latest_tx: None,
        }
    }

    /// Publish every fetched snapshot on `latest_tx`.
    pub fn with_latest(mut self, latest_tx: watch::Sender<MatchSnapshot>) -> Self {
        self.latest_tx = Some(latest_tx);
        self
    }

    /// Run until the match ends, the tracked message becomes unusable, the
    /// pre-match budget runs out, or `cancel_rx` flips to `true`.
    pub async fn run(self, mut cancel_rx: watch::Receiver<bool>) -> ExitReason {
        info!(name = %self.task.name, "Tracking started");

        let reason = self.track(&mut cancel_rx).await;

        self.ctx
            .registry
            .remove(self.task.user_id, &self.task.name)
            .await;
        info!(reason = %reason, "Tracking ended");

        if let Some(finished_tx) = &self.ctx.finished_tx {
            let event = TaskFinished {
                task_id: self.task.task_id,
                reason,
            };
            if finished_tx.send(event).await.is_err() {
                debug!("TaskFinished receiver dropped");
            }
        }

        reason
    }

    async fn track(&self, cancel_rx: &mut watch::Receiver<bool>) -> ExitReason {
        let config = &self.ctx.config;
        let mut tracker = PhaseTracker::new();
        let mut seen = SeenEvents::new();
        let mut waited_pre = Duration::ZERO;
        let mut waited_break = Duration::ZERO;
        let mut break_overrun_logged = false;

        loop {
            if *cancel_rx.borrow() {
                return ExitReason::Cancelled;
            }

            let snapshot = match self.ctx.fetcher.fetch(self.task.fixture_id).await {
                Ok(outcome) => outcome.into_snapshot(),
                Err(e) => {
                    warn!(error = %e, "Failed to fetch snapshot, retrying after poll interval");
                    if matches!(tracker.phase(), None | Some(Phase::PreMatch)) {
                        waited_pre += config.poll_interval;
                    }
                    if pause(cancel_rx, config.poll_interval).await {
                        return ExitReason::Cancelled;
                    }
                    continue;
                }
            };

            if let Some(latest_tx) = &self.latest_tx {
                latest_tx.send_replace(snapshot.clone());
            }

            let moments = tracker.advance(&snapshot.status, snapshot.phase);
            if !moments.is_empty() {
                info!(?moments, status = %snapshot.status, "Phase boundary crossed");
            }

            for moment in moments.iter().filter(|m| m.opens_play()) {
                self.announce(self.ctx.renderer.phase_moment(*moment, &snapshot))
                    .await;
            }
            for event in seen.advance(&snapshot.events) {
                if let Some(message) = self.ctx.renderer.event(event, &snapshot) {
                    self.announce(message).await;
                }
            }
            for moment in moments.iter().filter(|m| !m.opens_play()) {
                self.announce(self.ctx.renderer.phase_moment(*moment, &snapshot))
                    .await;
            }

            if let Some(reason) = self.update_tracked(&snapshot).await {
                return reason;
            }

            let delay = match tracker.phase() {
                Some(Phase::Finished) => return ExitReason::Finished,
                None | Some(Phase::PreMatch) => {
                    if waited_pre >= config.prematch_budget {
                        info!(
                            waited_secs = waited_pre.as_secs(),
                            "Kickoff not reached within pre-match budget"
                        );
                        return ExitReason::PreMatchTimeout;
                    }
                    let until_kickoff = snapshot.kickoff - OffsetDateTime::now_utc();
                    let delay = kickoff_poll_interval(
                        until_kickoff,
                        config.poll_interval,
                        config.kickoff_long_interval,
                    );
                    waited_pre += delay;
                    delay
                }
                Some(Phase::HalfBreak) => {
                    waited_break += config.poll_interval;
                    if waited_break >= config.break_budget && !break_overrun_logged {
                        warn!(
                            waited_secs = waited_break.as_secs(),
                            "Break is longer than expected, still polling"
                        );
                        break_overrun_logged = true;
                    }
                    config.poll_interval
                }
                Some(Phase::InProgress) => {
                    waited_break = Duration::ZERO;
                    break_overrun_logged = false;
                    config.poll_interval
                }
            };

            debug!(
                phase = ?tracker.phase(),
                delay_secs = delay.as_secs(),
                seen_events = seen.count(),
                "Waiting for next poll"
            );
            if pause(cancel_rx, delay).await {
                return ExitReason::Cancelled;
            }
        }
    }

    /// Push the current status to the tracked message. Returns the exit
    /// reason when the message can no longer be updated.
    async fn update_tracked(&self, snapshot: &MatchSnapshot) -> Option<ExitReason> {
        let message = self
            .ctx
            .renderer
            .status(snapshot)
            .stamped(OffsetDateTime::now_utc());

        match self
            .dispatcher
            .apply(self.ctx.sink.as_ref(), &self.tracked, &message)
            .await
        {
            DispatchOutcome::Applied | DispatchOutcome::Retrying => None,
            DispatchOutcome::GoneFatal => Some(ExitReason::SinkGone),
            DispatchOutcome::RetriesExhausted => Some(ExitReason::SinkRetriesExhausted),
        }
    }

    /// Send an announcement. Failures are logged and not retried.
    async fn announce(&self, message: WebhookMessage) {
        let Some(channel) = &self.announcements else {
            return;
        };
        let message = message.stamped(OffsetDateTime::now_utc());
        if let Err(e) = self.ctx.sink.send(channel, &message).await {
            warn!(channel = %channel, error = %e, "Failed to send announcement");
        }
    }
}

/// Sleep for `delay`. Returns `true` if cancellation was requested (or the
/// cancellation handle was dropped) before the delay elapsed.
async fn pause(cancel_rx: &mut watch::Receiver<bool>, delay: Duration) -> bool {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            biased;

            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    info!("Tracking task received cancellation");
                    return true;
                }
            }

            _ = &mut sleep => return false,
        }
    }
}
