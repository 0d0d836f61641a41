//! Events passed between the lifecycle tasks, the renderer and the
//! supervisor.
//!
//! # Event Flow
//!
//! 1. `MatchLifecycle` derives `PhaseMoment`s from each snapshot and hands
//!    them to the `Renderer`.
//! 2. `MatchLifecycle` emits `TaskFinished` -> `Supervisor` when it exits.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, TaskFinishedReceiver, TaskFinishedSender, task_finished_channel,
};
pub use types::{ExitReason, PhaseMoment, TaskFinished};
