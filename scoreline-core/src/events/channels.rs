//! Event channel factories and handles.

use super::types::TaskFinished;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for TaskFinished events.
pub type TaskFinishedSender = mpsc::Sender<TaskFinished>;
/// Receiver handle for TaskFinished events.
pub type TaskFinishedReceiver = mpsc::Receiver<TaskFinished>;

/// Create a new TaskFinished channel.
///
/// Every tracking task holds a clone of the sender; the supervisor owns
/// the receiver.
pub fn task_finished_channel() -> (TaskFinishedSender, TaskFinishedReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
