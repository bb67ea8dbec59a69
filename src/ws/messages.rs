//! WebSocket message types: the wire envelope and inbound events.
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": {...}}`.
//! Outbound events are [`crate::domain::ServerEvent`]s, which serialize to the
//! same envelope.

use serde::{Deserialize, Serialize};

use crate::error::HubError;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Event name.
    pub event: String,
    /// Event payload. Missing and `null` are treated as `{}`.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl WireMessage {
    /// Creates an envelope for `event` carrying `data`.
    #[must_use]
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Serializes the envelope to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Internal`] if serialization fails.
    pub fn to_text(&self) -> Result<String, HubError> {
        serde_json::to_string(self).map_err(|e| HubError::Internal(e.to_string()))
    }
}

/// Payload of an inbound `register` event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    /// Identifier the agent wants to be known under.
    pub session_id: Option<String>,
    /// Free-form agent data, stored under `info.data`.
    pub info: Option<serde_json::Value>,
}

/// Payload of an inbound `command` event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommandRequest {
    /// Target session.
    pub session_id: Option<String>,
    /// Command name.
    pub command: Option<String>,
    /// Optional argument forwarded to the agent.
    pub payload: Option<String>,
}

/// Payload of an inbound `command_result` event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CommandResultReport {
    /// Session the result belongs to, as reported by the agent.
    pub session_id: Option<String>,
    /// Result text.
    pub result: Option<String>,
}

/// Events a connected party can send.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// Agent announces its identity.
    Register(RegisterRequest),
    /// Operator asks the hub to forward a command to an agent.
    Command(CommandRequest),
    /// Agent reports the outcome of a command.
    CommandResult(CommandResultReport),
}

impl ClientEvent {
    /// Decodes a text frame into a typed event.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::MalformedMessage`] if the frame is not a valid
    /// envelope or its payload has the wrong shape, and
    /// [`HubError::UnknownEvent`] for an unhandled event name.
    pub fn parse(text: &str) -> Result<Self, HubError> {
        let wire: WireMessage = serde_json::from_str(text)?;
        Self::from_wire(wire)
    }

    /// Converts a decoded envelope into a typed event.
    ///
    /// # Errors
    ///
    /// See [`ClientEvent::parse`].
    pub fn from_wire(wire: WireMessage) -> Result<Self, HubError> {
        let data = match wire.data {
            serde_json::Value::Null => serde_json::Value::Object(serde_json::Map::new()),
            other => other,
        };
        match wire.event.as_str() {
            "register" => Ok(Self::Register(serde_json::from_value(data)?)),
            "command" => Ok(Self::Command(serde_json::from_value(data)?)),
            "command_result" => Ok(Self::CommandResult(serde_json::from_value(data)?)),
            other => Err(HubError::UnknownEvent(other.to_string())),
        }
    }

    /// Returns the wire name of this event.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Register(_) => "register",
            Self::Command(_) => "command",
            Self::CommandResult(_) => "command_result",
        }
    }
}
