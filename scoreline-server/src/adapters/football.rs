use async_trait::async_trait;
use reqwest::StatusCode;
use scoreline_core::entities::FixtureId;
use scoreline_core::fetcher::{DataProvider, ProviderError};
use scoreline_sdk::client::{ClientError, FootballClient};

/// [`DataProvider`] backed by the football API.
pub struct FootballProvider {
    client: FootballClient,
}

impl FootballProvider {
    pub fn new(client: FootballClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataProvider for FootballProvider {
    async fn fixture(&self, fixture_id: FixtureId) -> Result<serde_json::Value, ProviderError> {
        self.client
            .fixture(fixture_id.0)
            .await
            .map_err(|e| provider_error(fixture_id, e))
    }
}

fn provider_error(fixture_id: FixtureId, error: ClientError) -> ProviderError {
    match error {
        ClientError::Http(e) => ProviderError::Request(e.to_string()),
        ClientError::Url(e) => ProviderError::Request(e.to_string()),
        ClientError::Api { status, .. } if status == StatusCode::NOT_FOUND => {
            ProviderError::NotFound(fixture_id)
        }
        ClientError::Api { status, body } => ProviderError::Api(format!("{status}: {body}")),
        ClientError::Json(e) => ProviderError::Malformed(e.to_string()),
    }
}
