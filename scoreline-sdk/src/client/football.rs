//! Football data provider client.
//!
//! Speaks the API-Football v3 protocol: every request carries the
//! `x-rapidapi-host` / `x-rapidapi-key` header pair.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};

const HOST_HEADER: &str = "x-rapidapi-host";
const KEY_HEADER: &str = "x-rapidapi-key";

/// Typed HTTP client for the football data provider.
#[derive(Debug, Clone)]
pub struct FootballClient {
    http: Client,
    base_url: Url,
    api_key: String,
    timezone: String,
}

impl FootballClient {
    /// Create a new `FootballClient`.
    ///
    /// * `base_url` – provider root, e.g. `https://v3.football.api-sports.io`.
    /// * `api_key` – account key sent with every request.
    /// * `timezone` – IANA zone the provider renders fixture dates in.
    pub fn new(base_url: Url, api_key: impl Into<String>, timezone: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key: api_key.into(),
            timezone: timezone.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET /fixtures?id={fixture_id}` – the full fixture document.
    ///
    /// The body is returned untyped so callers can keep the raw payload
    /// next to whatever they parse out of it.
    pub async fn fixture(&self, fixture_id: u64) -> Result<serde_json::Value, ClientError> {
        let url = self.base_url.join("/fixtures")?;

        let resp = self
            .http
            .get(url)
            .header(HOST_HEADER, self.base_url.host_str().unwrap_or_default())
            .header(KEY_HEADER, &self.api_key)
            .query(&[
                ("id", fixture_id.to_string().as_str()),
                ("timezone", self.timezone.as_str()),
            ])
            .send()
            .await?;

        parse_response(resp).await
    }
}
