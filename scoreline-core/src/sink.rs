//! Notification Sink interface.
//!
//! A sink delivers rendered messages to a named output channel and can
//! later edit a message it delivered. Failures are split into the two
//! unrecoverable cases (the message or channel is gone, access was
//! revoked) and everything that may succeed on a second attempt.

use async_trait::async_trait;
use scoreline_sdk::objects::WebhookMessage;
use thiserror::Error;

/// Name of a configured output channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a message previously delivered by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle {
    pub channel: ChannelId,
    pub message_id: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The message or the channel no longer exists.
    #[error("message or channel not found")]
    NotFound,

    /// The sink refuses access to the channel.
    #[error("access to channel forbidden")]
    Forbidden,

    /// Rate limiting, transport failure or a server-side error.
    #[error("transient sink failure: {0}")]
    Transient(String),
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(
        &self,
        channel: &ChannelId,
        message: &WebhookMessage,
    ) -> Result<MessageHandle, SinkError>;

    async fn edit(&self, handle: &MessageHandle, message: &WebhookMessage) -> Result<(), SinkError>;
}
