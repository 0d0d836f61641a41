//! Follow API handlers.
//!
//! # Endpoints
//!
//! - `POST   /users/{user_id}/follows`           – start following a match
//! - `GET    /users/{user_id}/follows`           – games the user follows
//! - `DELETE /users/{user_id}/follows/{task_id}` – stop a tracking task
//! - `GET    /users/{user_id}/follows/{task_id}/stats` – full match statistics
//! - `GET    /teams/{team}/next`                 – a team's next fixture

use axum::{
    Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get},
};
use scoreline_core::processors::{FollowError, StatsError, StopError};

use crate::state::AppState;

mod follows;
mod teams;

/// Build the Follow API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{user_id}/follows",
            get(follows::list_follows).post(follows::create_follow),
        )
        .route(
            "/users/{user_id}/follows/{task_id}",
            delete(follows::stop_follow),
        )
        .route(
            "/users/{user_id}/follows/{task_id}/stats",
            get(follows::full_stats),
        )
        .route("/teams/{team}/next", get(teams::next_fixture))
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Errors that can occur in Follow API handlers.
#[derive(Debug)]
enum ApiError {
    /// The request body is unusable.
    BadRequest(String),
    Follow(FollowError),
    Stop(StopError),
    Stats(StatsError),
}

impl From<FollowError> for ApiError {
    fn from(e: FollowError) -> Self {
        ApiError::Follow(e)
    }
}

impl From<StopError> for ApiError {
    fn from(e: StopError) -> Self {
        ApiError::Stop(e)
    }
}

impl From<StatsError> for ApiError {
    fn from(e: StatsError) -> Self {
        ApiError::Stats(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Follow(e) => match e {
                FollowError::AtCapacity { .. } | FollowError::RegistryRace { .. } => {
                    StatusCode::CONFLICT
                }
                FollowError::UnknownTeam(_) | FollowError::NoUpcomingFixture(_) => {
                    StatusCode::NOT_FOUND
                }
                FollowError::Provider(_) | FollowError::Sink(_) => StatusCode::BAD_GATEWAY,
            },
            ApiError::Stop(StopError::UnknownTask(_)) => StatusCode::NOT_FOUND,
            ApiError::Stop(StopError::NotOwner(_)) => StatusCode::FORBIDDEN,
            ApiError::Stats(StatsError::UnknownTask(_)) => StatusCode::NOT_FOUND,
            ApiError::Stats(StatsError::NotOwner(_)) => StatusCode::FORBIDDEN,
            ApiError::Stats(StatsError::CoolingDown { .. }) => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(message) => message,
            ApiError::Follow(e) => {
                if status == StatusCode::BAD_GATEWAY {
                    tracing::error!(error = %e, "Follow request failed upstream");
                }
                e.to_string()
            }
            ApiError::Stop(e) => e.to_string(),
            ApiError::Stats(StatsError::CoolingDown { retry_after_secs }) => {
                let message = StatsError::CoolingDown { retry_after_secs }.to_string();
                let retry_after = [(header::RETRY_AFTER, retry_after_secs.to_string())];
                return (status, retry_after, message).into_response();
            }
            ApiError::Stats(e) => e.to_string(),
        };
        (status, message).into_response()
    }
}
