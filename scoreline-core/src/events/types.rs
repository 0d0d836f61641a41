//! Event type definitions.
//!
//! Phase moments are produced by the lifecycle state machine and consumed
//! by the renderer. Task-finished notices flow from each tracking task back
//! to the supervisor so it can reap the task table.

use uuid::Uuid;

/// A phase boundary worth announcing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseMoment {
    GameStarted,
    HalftimeReached,
    BreakTimeReached,
    SecondHalfStarted,
    ExtraTimeStarted,
    PenaltyStarted,
    GameEnded,
}

impl PhaseMoment {
    pub fn title(&self) -> &'static str {
        match self {
            PhaseMoment::GameStarted => "🎉 Game Started 🎉",
            PhaseMoment::HalftimeReached => "⏳ Halftime Reached ⏳",
            PhaseMoment::BreakTimeReached => "⏳ Break Time Reached ⏳",
            PhaseMoment::SecondHalfStarted => "🎉 Second Half Started 🎉",
            PhaseMoment::ExtraTimeStarted => "🎉 Extra Time Started 🎉",
            PhaseMoment::PenaltyStarted => "🎉 Penalty Started 🎉",
            PhaseMoment::GameEnded => "🏁 Game Ended 🏁",
        }
    }

    /// Moments that open a period of play. They are announced before the
    /// events observed on the same poll; the others after.
    pub fn opens_play(&self) -> bool {
        matches!(
            self,
            PhaseMoment::GameStarted
                | PhaseMoment::SecondHalfStarted
                | PhaseMoment::ExtraTimeStarted
                | PhaseMoment::PenaltyStarted
        )
    }
}

impl std::fmt::Display for PhaseMoment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PhaseMoment::GameStarted => "game_started",
            PhaseMoment::HalftimeReached => "halftime_reached",
            PhaseMoment::BreakTimeReached => "break_time_reached",
            PhaseMoment::SecondHalfStarted => "second_half_started",
            PhaseMoment::ExtraTimeStarted => "extra_time_started",
            PhaseMoment::PenaltyStarted => "penalty_started",
            PhaseMoment::GameEnded => "game_ended",
        };
        f.write_str(name)
    }
}

/// Why a tracking task stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The match reached a terminal status.
    Finished,
    /// Kickoff never came within the pre-match budget.
    PreMatchTimeout,
    /// The tracked message or its channel is gone.
    SinkGone,
    /// Every attempt to update the tracked message failed.
    SinkRetriesExhausted,
    /// The user or the process asked the task to stop.
    Cancelled,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            ExitReason::Finished => "finished",
            ExitReason::PreMatchTimeout => "prematch_timeout",
            ExitReason::SinkGone => "sink_gone",
            ExitReason::SinkRetriesExhausted => "sink_retries_exhausted",
            ExitReason::Cancelled => "cancelled",
        };
        f.write_str(reason)
    }
}

/// Emitted by a tracking task right before it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFinished {
    pub task_id: Uuid,
    pub reason: ExitReason,
}
