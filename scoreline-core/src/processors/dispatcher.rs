//! Update Dispatcher.
//!
//! Applies a rendered message to the tracked message with bounded retry.
//! A missing message or revoked access ends the attempt at once; transient
//! failures are retried immediately until the attempt budget runs out.

use scoreline_sdk::objects::WebhookMessage;
use tracing::{debug, warn};

use crate::sink::{MessageHandle, NotificationSink, SinkError};

/// Default attempts per update.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The message was updated.
    Applied,
    /// The message or channel is gone for good. The task must stop.
    GoneFatal,
    /// A single transient failure; another attempt may succeed.
    Retrying,
    /// Every attempt failed transiently. Treated like [`GoneFatal`](Self::GoneFatal).
    RetriesExhausted,
}

impl DispatchOutcome {
    /// Classify a single failed attempt.
    pub fn classify(error: &SinkError) -> Self {
        match error {
            SinkError::NotFound | SinkError::Forbidden => DispatchOutcome::GoneFatal,
            SinkError::Transient(_) => DispatchOutcome::Retrying,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct UpdateDispatcher {
    max_attempts: u32,
}

impl Default for UpdateDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl UpdateDispatcher {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Edit `handle` to show `message`.
    ///
    /// Never returns [`DispatchOutcome::Retrying`].
    pub async fn apply(
        &self,
        sink: &dyn NotificationSink,
        handle: &MessageHandle,
        message: &WebhookMessage,
    ) -> DispatchOutcome {
        for attempt in 1..=self.max_attempts {
            let error = match sink.edit(handle, message).await {
                Ok(()) => {
                    debug!(attempt, message_id = %handle.message_id, "Tracked message updated");
                    return DispatchOutcome::Applied;
                }
                Err(e) => e,
            };

            match DispatchOutcome::classify(&error) {
                DispatchOutcome::Retrying => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        message_id = %handle.message_id,
                        error = %error,
                        "Transient failure updating tracked message"
                    );
                }
                outcome => {
                    warn!(
                        message_id = %handle.message_id,
                        channel = %handle.channel,
                        error = %error,
                        "Tracked message is gone"
                    );
                    return outcome;
                }
            }
        }

        DispatchOutcome::RetriesExhausted
    }
}
