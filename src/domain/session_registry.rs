//! Authoritative mapping from session identifier to owning connection.
//!
//! [`SessionRegistry`] is a plain owned map with `&mut self` mutators. It
//! carries no lock of its own: the [`crate::service::EventRouter`] holds the
//! single instance behind a mutex so that a mutation and the broadcast that
//! follows it are never interleaved with another mutation.

use std::collections::HashMap;

use super::ConnectionId;
use super::session::{Session, SessionInfo, SessionSnapshot};
use crate::error::HubError;

/// Live sessions keyed by `session_id`.
///
/// # Invariants
///
/// - At most one entry per `session_id` (re-register replaces).
/// - At most one entry per connection (registering under a new id releases
///   the connection's previous id).
/// - Entries are removed through [`SessionRegistry::remove_by_connection`]
///   when their connection closes.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `session_id`.
    ///
    /// Returns the superseded session when `session_id` was already
    /// registered. If `connection` held a different id, that entry is removed
    /// in the same step.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidInput`] if `session_id` is empty. The
    /// registry is left untouched.
    pub fn register(
        &mut self,
        session_id: &str,
        connection: ConnectionId,
        info: SessionInfo,
    ) -> Result<Option<Session>, HubError> {
        if session_id.is_empty() {
            return Err(HubError::InvalidInput("session_id is required".to_string()));
        }

        self.sessions
            .retain(|id, s| id == session_id || s.connection != connection);

        let session = Session::new(session_id.to_string(), connection, info);
        Ok(self.sessions.insert(session_id.to_string(), session))
    }

    /// Removes the session owned by `connection`, if any.
    ///
    /// Linear scan; returns the removed identifier.
    pub fn remove_by_connection(&mut self, connection: ConnectionId) -> Option<String> {
        let session_id = self.session_for_connection(connection)?.to_string();
        self.sessions.remove(&session_id);
        Some(session_id)
    }

    /// Returns the session registered under `session_id`.
    #[must_use]
    pub fn lookup(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    /// Returns the session id owned by `connection`, found by scan.
    #[must_use]
    pub fn session_for_connection(&self, connection: ConnectionId) -> Option<&str> {
        self.sessions
            .values()
            .find(|s| s.connection == connection)
            .map(|s| s.session_id.as_str())
    }

    /// Copies the public view (`session_id -> info`) of every entry.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.sessions.values().collect()
    }

    /// Returns the number of registered sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no session is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
