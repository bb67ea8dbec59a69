//! Broadcast channel for hub-wide events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every WebSocket
//! connection subscribes once on upgrade, so publishing a [`ServerEvent`]
//! reaches every connected party regardless of role.

use tokio::sync::broadcast;

use super::ServerEvent;

/// Broadcast bus for [`ServerEvent`]s.
///
/// Backed by a `tokio::broadcast` ring buffer with a configurable capacity.
/// Publishing never blocks; receivers that fall behind lose the oldest
/// events.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of receivers that received the event.
    /// If there are no active receivers, the event is silently dropped.
    pub fn publish(&self, event: ServerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will receive all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
