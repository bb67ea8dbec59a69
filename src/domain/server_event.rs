//! Named events the hub emits to connected parties.
//!
//! Every [`ServerEvent`] serializes to the wire envelope
//! `{"event": "<name>", "data": <payload>}`. Some are sent to a single
//! connection (acknowledgements, errors, commands), others are published on
//! the [`super::EventBus`] and reach every connection.

use serde::Serialize;

use super::session::SessionSnapshot;

/// Outcome reported to an operator after a `command` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommandStatus {
    /// The command was queued for the target agent's connection. This is not
    /// confirmation that the agent received it.
    Sent {
        /// Target session.
        session_id: String,
        /// Command name as sent.
        command: String,
    },
    /// The command was rejected before dispatch.
    Error {
        /// Human-readable reason.
        message: String,
    },
}

/// Event emitted by the hub.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Acknowledges a successful `register` to the registering connection.
    Registered {
        /// Always `"ok"`.
        status: &'static str,
    },

    /// Reports a rejected inbound event to its originator.
    Error {
        /// Human-readable reason.
        message: String,
    },

    /// Command delivered to the target agent's connection only.
    Command {
        /// Command name.
        cmd: String,
        /// Opaque command argument (empty string when none was given).
        payload: String,
    },

    /// Dispatch outcome sent back to the operator that issued a command.
    CommandStatus(CommandStatus),

    /// Agent result, broadcast to every connection.
    CommandResult {
        /// Session that produced the result, as reported by the agent.
        session_id: String,
        /// Result text, forwarded verbatim.
        result: String,
    },

    /// Current public view of the registry, broadcast after every change.
    SessionsUpdate(SessionSnapshot),
}

impl ServerEvent {
    /// The `registered` acknowledgement.
    #[must_use]
    pub const fn registered() -> Self {
        Self::Registered { status: "ok" }
    }

    /// Returns the wire name of this event.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "registered",
            Self::Error { .. } => "error",
            Self::Command { .. } => "command",
            Self::CommandStatus(_) => "command_status",
            Self::CommandResult { .. } => "command_result",
            Self::SessionsUpdate(_) => "sessions_update",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_json(event: &ServerEvent) -> serde_json::Value {
        let Ok(value) = serde_json::to_value(event) else {
            panic!("serialization failed");
        };
        value
    }

    #[test]
    fn registered_envelope() {
        assert_eq!(
            to_json(&ServerEvent::registered()),
            json!({"event": "registered", "data": {"status": "ok"}})
        );
    }

    #[test]
    fn command_status_sent_is_flat() {
        let event = ServerEvent::CommandStatus(CommandStatus::Sent {
            session_id: "bot1".into(),
            command: "whoami".into(),
        });
        assert_eq!(
            to_json(&event),
            json!({
                "event": "command_status",
                "data": {"status": "sent", "session_id": "bot1", "command": "whoami"}
            })
        );
    }

    #[test]
    fn command_status_error_carries_message() {
        let event = ServerEvent::CommandStatus(CommandStatus::Error {
            message: "Session ghost not found".into(),
        });
        assert_eq!(
            to_json(&event),
            json!({
                "event": "command_status",
                "data": {"status": "error", "message": "Session ghost not found"}
            })
        );
    }

    #[test]
    fn empty_sessions_update_is_empty_object() {
        let event = ServerEvent::SessionsUpdate(SessionSnapshot::default());
        assert_eq!(to_json(&event), json!({"event": "sessions_update", "data": {}}));
    }

    #[test]
    fn event_name_matches_tag() {
        let events = [
            ServerEvent::registered(),
            ServerEvent::Error { message: "x".into() },
            ServerEvent::Command { cmd: "ls".into(), payload: String::new() },
            ServerEvent::CommandResult { session_id: "a".into(), result: "b".into() },
            ServerEvent::SessionsUpdate(SessionSnapshot::default()),
        ];
        for event in &events {
            assert_eq!(to_json(event).get("event"), Some(&json!(event.event_name())));
        }
    }
}
