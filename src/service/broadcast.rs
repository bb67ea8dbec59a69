//! Broadcast emitter: fans registry changes and agent results out to every
//! connection.

use crate::domain::{EventBus, ServerEvent, SessionRegistry};

/// Derives hub-wide events and publishes them on the [`EventBus`].
#[derive(Debug, Clone)]
pub struct BroadcastEmitter {
    event_bus: EventBus,
}

impl BroadcastEmitter {
    /// Creates an emitter publishing on `event_bus`.
    #[must_use]
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Publishes one `sessions_update` with the registry's current snapshot.
    ///
    /// Callers hold the registry lock, so observers see snapshots in mutation
    /// order. Returns the number of receivers.
    pub fn publish_sessions(&self, registry: &SessionRegistry) -> usize {
        let snapshot = registry.snapshot();
        let sessions = snapshot.len();
        let recipients = self.event_bus.publish(ServerEvent::SessionsUpdate(snapshot));
        tracing::debug!(sessions, recipients, "sessions_update broadcast");
        recipients
    }

    /// Publishes a `command_result` verbatim. Returns the number of receivers.
    pub fn publish_result(&self, session_id: String, result: String) -> usize {
        self.event_bus
            .publish(ServerEvent::CommandResult { session_id, result })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, SessionInfo};

    #[tokio::test]
    async fn publishes_current_snapshot() {
        let emitter = BroadcastEmitter::new(EventBus::new(8));
        let mut rx = emitter.event_bus().subscribe();

        let mut registry = SessionRegistry::new();
        let info = SessionInfo::new("127.0.0.1", None, None);
        let Ok(_) = registry.register("bot1", ConnectionId::new(), info.clone()) else {
            panic!("register failed");
        };

        assert_eq!(emitter.publish_sessions(&registry), 1);
        let Ok(ServerEvent::SessionsUpdate(snapshot)) = rx.recv().await else {
            panic!("expected sessions_update");
        };
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.get("bot1"), Some(&info));
    }

    #[tokio::test]
    async fn publishes_result_verbatim() {
        let emitter = BroadcastEmitter::new(EventBus::new(8));
        let mut rx = emitter.event_bus().subscribe();

        emitter.publish_result("bot1".into(), "uid=0(root)\n".into());
        let Ok(event) = rx.recv().await else {
            panic!("expected command_result");
        };
        assert_eq!(
            event,
            ServerEvent::CommandResult {
                session_id: "bot1".into(),
                result: "uid=0(root)\n".into(),
            }
        );
    }
}
