//! Follow API client (chat frontend → Scoreline server).

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, ensure_success, parse_response};
use crate::objects::follow::{FollowBody, FollowTicket, FollowingList, NextFixture};
use crate::objects::message::WebhookMessage;

/// Typed HTTP client for the Scoreline **follow API**.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    http: Client,
    base_url: Url,
}

impl TrackerClient {
    /// Create a new `TrackerClient` for the server rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /users/{user_id}/follows` – start following a match.
    pub async fn follow(&self, user_id: u64, body: &FollowBody) -> Result<FollowTicket, ClientError> {
        let url = self.base_url.join(&format!("/users/{user_id}/follows"))?;

        let resp = self.http.post(url).json(body).send().await?;

        parse_response(resp).await
    }

    /// `GET /users/{user_id}/follows` – games the user is following.
    pub async fn following(&self, user_id: u64) -> Result<FollowingList, ClientError> {
        let url = self.base_url.join(&format!("/users/{user_id}/follows"))?;

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }

    /// `DELETE /users/{user_id}/follows/{task_id}` – stop a tracking task.
    pub async fn stop(&self, user_id: u64, task_id: Uuid) -> Result<(), ClientError> {
        let url = self
            .base_url
            .join(&format!("/users/{user_id}/follows/{task_id}"))?;

        let resp = self.http.delete(url).send().await?;

        ensure_success(resp).await.map(|_| ())
    }

    /// `GET /users/{user_id}/follows/{task_id}/stats` – every statistic of
    /// a followed match. Fails with `429` when asked again too soon.
    pub async fn full_stats(
        &self,
        user_id: u64,
        task_id: Uuid,
    ) -> Result<WebhookMessage, ClientError> {
        let url = self
            .base_url
            .join(&format!("/users/{user_id}/follows/{task_id}/stats"))?;

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }

    /// `GET /teams/{team}/next` – the team's next scheduled fixture.
    pub async fn next_fixture(&self, team: &str) -> Result<NextFixture, ClientError> {
        let mut url = self.base_url.join("/teams")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(team)
            .push("next");

        let resp = self.http.get(url).send().await?;

        parse_response(resp).await
    }
}
