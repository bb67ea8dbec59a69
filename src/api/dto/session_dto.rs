//! Session DTOs for the read-only REST view of the registry.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Session, SessionInfo};

/// Single session detail for `GET /sessions/{session_id}`.
///
/// Carries the public info and registration time, never the connection
/// handle.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionDetailResponse {
    /// Agent-supplied session identifier.
    pub session_id: String,
    /// Connection-derived fields plus agent data.
    pub info: SessionInfo,
    /// When the session was last registered.
    pub registered_at: DateTime<Utc>,
}

impl From<Session> for SessionDetailResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            info: session.info,
            registered_at: session.registered_at,
        }
    }
}
