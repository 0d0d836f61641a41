use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use scoreline_core::sink::{ChannelId, MessageHandle, NotificationSink, SinkError};
use scoreline_sdk::client::{ClientError, WebhookClient};
use scoreline_sdk::objects::WebhookMessage;
use url::Url;

/// [`NotificationSink`] posting to named chat webhooks.
pub struct WebhookSink {
    client: WebhookClient,
    webhooks: BTreeMap<String, Url>,
}

impl WebhookSink {
    pub fn new(client: WebhookClient, webhooks: BTreeMap<String, Url>) -> Self {
        Self { client, webhooks }
    }

    fn webhook(&self, channel: &ChannelId) -> Result<&Url, SinkError> {
        self.webhooks.get(channel.as_str()).ok_or(SinkError::NotFound)
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(
        &self,
        channel: &ChannelId,
        message: &WebhookMessage,
    ) -> Result<MessageHandle, SinkError> {
        let webhook = self.webhook(channel)?;
        let sent = self
            .client
            .execute(webhook, message)
            .await
            .map_err(sink_error)?;
        Ok(MessageHandle {
            channel: channel.clone(),
            message_id: sent.id,
        })
    }

    async fn edit(&self, handle: &MessageHandle, message: &WebhookMessage) -> Result<(), SinkError> {
        let webhook = self.webhook(&handle.channel)?;
        self.client
            .edit(webhook, &handle.message_id, message)
            .await
            .map_err(sink_error)
    }
}

fn sink_error(error: ClientError) -> SinkError {
    match error.status() {
        Some(StatusCode::NOT_FOUND) => SinkError::NotFound,
        Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => SinkError::Forbidden,
        _ => SinkError::Transient(error.to_string()),
    }
}
