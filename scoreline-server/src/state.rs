//! Application state shared across all request handlers.

use crate::config::ChannelSettings;
use scoreline_core::processors::Supervisor;
use std::sync::Arc;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Command surface of the tracker.
    pub supervisor: Supervisor,
    /// Webhook channels known at startup.
    pub channels: Arc<ChannelSettings>,
}

impl AppState {
    pub fn new(supervisor: Supervisor, channels: ChannelSettings) -> Self {
        Self {
            supervisor,
            channels: Arc::new(channels),
        }
    }
}
