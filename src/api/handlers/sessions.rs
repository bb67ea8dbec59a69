//! Read-only session endpoints: snapshot and single-session lookup.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::SessionDetailResponse;
use crate::app_state::AppState;
use crate::domain::SessionInfo;
use crate::error::{ErrorResponse, HubError};

/// `GET /sessions`: Current registry snapshot.
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "List sessions",
    description = "Returns the same `session_id -> info` map that is broadcast as `sessions_update`.",
    responses(
        (status = 200, description = "Registry snapshot", body = std::collections::BTreeMap<String, SessionInfo>),
    )
)]
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.router.snapshot().await)
}

/// `GET /sessions/{session_id}`: One registered session.
///
/// # Errors
///
/// Returns [`HubError::SessionNotFound`] if no agent is registered under
/// `session_id`.
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{session_id}",
    tag = "Sessions",
    summary = "Get session details",
    description = "Returns the public info and registration time of a single session.",
    params(
        ("session_id" = String, Path, description = "Agent-supplied session identifier"),
    ),
    responses(
        (status = 200, description = "Session details", body = SessionDetailResponse),
        (status = 404, description = "Session not found", body = ErrorResponse),
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, HubError> {
    let session = state.router.lookup(&session_id).await?;
    Ok(Json(SessionDetailResponse::from(session)))
}

/// Session routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/sessions/{session_id}", get(get_session))
}
