use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use super::ApiError;
use crate::state::AppState;

/// `GET /teams/{team}/next` – the team's next fixture and its kickoff.
pub(super) async fn next_fixture(
    State(state): State<AppState>,
    Path(team): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let next = state.supervisor.next_fixture(&team)?;
    Ok(Json(next))
}
