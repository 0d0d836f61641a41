//! Processors of the live tracker.
//!
//! - `Supervisor`: handles follow / stop commands, spawns one
//!   `MatchLifecycle` per followed fixture and reaps `TaskFinished`
//! - `MatchLifecycle`: polls one fixture, announces phase moments and
//!   notable events, keeps the tracked message current
//! - `UpdateDispatcher`: applies an update to the tracked message with
//!   bounded retry

pub mod dispatcher;
pub mod lifecycle;
pub mod supervisor;

pub use dispatcher::{DispatchOutcome, UpdateDispatcher};
pub use lifecycle::{MatchLifecycle, PhaseTracker, TrackingContext, TrackingTask};
pub use supervisor::{
    FollowError, FollowRequest, FollowTarget, STATS_COOLDOWN, StatsError, StopError, Supervisor,
};
