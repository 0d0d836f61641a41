//! Chat webhook client.
//!
//! A webhook URL identifies one output channel. Executing it with
//! `wait=true` returns the created message, whose id can later be used to
//! edit that message in place.

use reqwest::Client;
use url::Url;

use super::{ClientError, ensure_success, parse_response};
use crate::objects::message::{SentMessage, WebhookMessage};

/// Typed HTTP client for chat webhooks.
#[derive(Debug, Clone, Default)]
pub struct WebhookClient {
    http: Client,
}

impl WebhookClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST {webhook}?wait=true` – post a new message.
    pub async fn execute(
        &self,
        webhook: &Url,
        message: &WebhookMessage,
    ) -> Result<SentMessage, ClientError> {
        let resp = self
            .http
            .post(webhook.clone())
            .query(&[("wait", "true")])
            .json(message)
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `PATCH {webhook}/messages/{message_id}` – replace a message's body.
    pub async fn edit(
        &self,
        webhook: &Url,
        message_id: &str,
        message: &WebhookMessage,
    ) -> Result<(), ClientError> {
        let url = message_url(webhook, message_id)?;

        let resp = self.http.patch(url).json(message).send().await?;

        ensure_success(resp).await.map(|_| ())
    }
}

fn message_url(webhook: &Url, message_id: &str) -> Result<Url, url::ParseError> {
    let mut url = webhook.clone();
    url.set_query(None);
    let base = url.as_str().trim_end_matches('/').to_owned();
    let mut url = Url::parse(&format!("{base}/messages/{message_id}"))?;
    url.set_query(webhook.query());
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_url_keeps_thread_query() {
        let webhook =
            Url::parse("https://chat.example/api/webhooks/1/tok?thread_id=77").unwrap();
        let url = message_url(&webhook, "12345").unwrap();
        assert_eq!(
            url.as_str(),
            "https://chat.example/api/webhooks/1/tok/messages/12345?thread_id=77"
        );
    }

    #[test]
    fn test_message_url_trailing_slash() {
        let webhook = Url::parse("https://chat.example/api/webhooks/1/tok/").unwrap();
        let url = message_url(&webhook, "9").unwrap();
        assert_eq!(url.as_str(), "https://chat.example/api/webhooks/1/tok/messages/9");
    }
}
