//! Session entry and its public-facing view.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ConnectionId;

/// Client descriptor recorded when the connection did not send one.
pub const UNKNOWN_USER_AGENT: &str = "Unknown";

/// Metadata describing a registered agent.
///
/// Connection-derived fields sit next to the agent-supplied payload, which is
/// nested under `data` so an agent can never overwrite `ip` or `user_agent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionInfo {
    /// Origin address of the owning connection.
    pub ip: String,
    /// Client descriptor (the `User-Agent` header of the upgrade request).
    pub user_agent: String,
    /// Free-form data supplied by the agent at registration time.
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

impl SessionInfo {
    /// Builds session metadata from connection fields and optional agent data.
    ///
    /// Absent or `null` agent data is stored as an empty object.
    #[must_use]
    pub fn new(
        ip: impl Into<String>,
        user_agent: Option<&str>,
        data: Option<serde_json::Value>,
    ) -> Self {
        let data = match data {
            Some(serde_json::Value::Null) | None => {
                serde_json::Value::Object(serde_json::Map::new())
            }
            Some(value) => value,
        };
        Self {
            ip: ip.into(),
            user_agent: user_agent.unwrap_or(UNKNOWN_USER_AGENT).to_string(),
            data,
        }
    }
}

/// One registered agent: identity, owning connection and metadata.
#[derive(Debug, Clone)]
pub struct Session {
    /// Agent-supplied identifier (registry key).
    pub session_id: String,

    /// Connection that currently owns this session.
    pub connection: ConnectionId,

    /// Public metadata, included in every snapshot.
    pub info: SessionInfo,

    /// When this entry was (re-)registered.
    pub registered_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new `Session` stamped with the current time.
    #[must_use]
    pub fn new(session_id: String, connection: ConnectionId, info: SessionInfo) -> Self {
        Self {
            session_id,
            connection,
            info,
            registered_at: Utc::now(),
        }
    }
}

/// Public view of the registry: `session_id -> info`, ordered by id.
///
/// Never carries connection handles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionSnapshot(BTreeMap<String, SessionInfo>);

impl SessionSnapshot {
    /// Returns the info recorded for `session_id`, if present.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<&SessionInfo> {
        self.0.get(session_id)
    }

    /// Number of sessions in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no sessions were registered when the snapshot was taken.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Session identifiers in ascending order.
    pub fn session_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Consumes the snapshot, returning the inner map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, SessionInfo> {
        self.0
    }
}

impl<'a> FromIterator<&'a Session> for SessionSnapshot {
    fn from_iter<I: IntoIterator<Item = &'a Session>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|s| (s.session_id.clone(), s.info.clone()))
                .collect(),
        )
    }
}
