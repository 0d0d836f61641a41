use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use scoreline_core::entities::{FixtureId, UserId};
use scoreline_core::processors::{FollowRequest, FollowTarget};
use scoreline_core::sink::ChannelId;
use scoreline_sdk::objects::FollowBody;
use uuid::Uuid;

use super::ApiError;
use crate::config::ChannelSettings;
use crate::state::AppState;

/// `POST /users/{user_id}/follows` – start following a match.
///
/// Sends the tracked message before answering, so a `201` means the
/// message exists and its task is running.
pub(super) async fn create_follow(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Json(body): Json<FollowBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = follow_request(&state.channels, UserId(user_id), body)?;
    let ticket = state.supervisor.follow(request).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// `GET /users/{user_id}/follows` – games the user follows.
pub(super) async fn list_follows(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
) -> impl IntoResponse {
    Json(state.supervisor.following(UserId(user_id)).await)
}

/// `DELETE /users/{user_id}/follows/{task_id}` – stop a tracking task.
pub(super) async fn stop_follow(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(u64, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    state.supervisor.stop(UserId(user_id), task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/{user_id}/follows/{task_id}/stats` – every statistic of a
/// followed match, rendered as a message.
pub(super) async fn full_stats(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(u64, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let message = state.supervisor.full_stats(UserId(user_id), task_id).await?;
    Ok(Json(message))
}

/// Resolve a request body against the configured channels.
///
/// Announcements go to the named channel, else the configured
/// announcement channel, else the tracked message's channel.
fn follow_request(
    channels: &ChannelSettings,
    user_id: UserId,
    body: FollowBody,
) -> Result<FollowRequest, ApiError> {
    let target = match (body.fixture_id, body.team) {
        (Some(fixture_id), None) => FollowTarget::Fixture(FixtureId(fixture_id)),
        (None, Some(team)) if !team.trim().is_empty() => FollowTarget::Team(team.trim().to_string()),
        _ => {
            return Err(ApiError::BadRequest(
                "name exactly one of fixture_id or team".to_string(),
            ));
        }
    };

    let channel = body.channel.unwrap_or_else(|| channels.default.clone());
    let announcements = body
        .announcements
        .or_else(|| channels.announcements.clone())
        .unwrap_or_else(|| channel.clone());

    for name in [&channel, &announcements] {
        if !channels.contains(name) {
            return Err(ApiError::BadRequest(format!("unknown channel {name:?}")));
        }
    }

    Ok(FollowRequest {
        user_id,
        target,
        channel: ChannelId::new(channel),
        announcements: Some(ChannelId::new(announcements)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use url::Url;

    fn channels(announcements: Option<&str>) -> ChannelSettings {
        let hook = Url::parse("https://chat.test/api/webhooks/1/abc").unwrap();
        ChannelSettings {
            default: "matches".to_string(),
            announcements: announcements.map(str::to_string),
            webhooks: BTreeMap::from([
                ("matches".to_string(), hook.clone()),
                ("goals".to_string(), hook),
            ]),
        }
    }

    fn body(fixture_id: Option<u64>, team: Option<&str>) -> FollowBody {
        FollowBody {
            fixture_id,
            team: team.map(str::to_string),
            channel: None,
            announcements: None,
        }
    }

    #[test]
    fn test_defaults_to_configured_channels() {
        let request = follow_request(&channels(Some("goals")), UserId(1), body(Some(9), None)).unwrap();
        assert_eq!(request.target, FollowTarget::Fixture(FixtureId(9)));
        assert_eq!(request.channel, ChannelId::new("matches"));
        assert_eq!(request.announcements, Some(ChannelId::new("goals")));
    }

    #[test]
    fn test_announcements_fall_back_to_tracked_channel() {
        let mut follow = body(None, Some(" Arsenal "));
        follow.channel = Some("goals".to_string());
        let request = follow_request(&channels(None), UserId(1), follow).unwrap();
        assert_eq!(request.target, FollowTarget::Team("Arsenal".to_string()));
        assert_eq!(request.announcements, Some(ChannelId::new("goals")));
    }

    #[test]
    fn test_target_must_be_exactly_one() {
        for follow in [body(None, None), body(Some(9), Some("Arsenal")), body(None, Some("  "))] {
            assert!(matches!(
                follow_request(&channels(None), UserId(1), follow),
                Err(ApiError::BadRequest(_))
            ));
        }
    }

    #[test]
    fn test_unknown_channel_is_rejected() {
        let mut follow = body(Some(9), None);
        follow.announcements = Some("elsewhere".to_string());
        assert!(matches!(
            follow_request(&channels(None), UserId(1), follow),
            Err(ApiError::BadRequest(_))
        ));
    }
}
