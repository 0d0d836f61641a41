//! Request and response bodies of the follow API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `POST /users/{user_id}/follows` body.
///
/// Exactly one of `fixture_id` or `team` selects the match. When `team` is
/// given, the server looks up the team's next scheduled fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Channel receiving the live status message. Server default if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Channel receiving goal / card / phase announcements. Falls back to
    /// `channel` if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announcements: Option<String>,
}

/// Returned once a tracking task has been started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowTicket {
    pub task_id: Uuid,
    pub fixture_id: u64,
    /// `"{home} vs {away}"`.
    pub name: String,
    /// Number of games the user follows, including this one.
    pub following: usize,
    pub max: usize,
}

/// `GET /users/{user_id}/follows` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowingList {
    pub count: usize,
    pub max: usize,
    pub available: usize,
    pub games: Vec<String>,
}

/// `GET /teams/{team}/next` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextFixture {
    pub team: String,
    pub fixture_id: u64,
    /// Kickoff as `DD/MM/YYYY @ HH:MM`, or `DD/MM/YYYY @ Not Determined`
    /// when the provider has not fixed the time yet.
    pub kickoff: String,
}
