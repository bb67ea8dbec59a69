//! Targeted delivery to individual connections.
//!
//! Broadcasts travel over the [`crate::domain::EventBus`]; everything meant
//! for exactly one connection (acknowledgements, errors, commands) goes
//! through that connection's bounded outbound queue, looked up here by
//! [`ConnectionId`].

use std::collections::HashMap;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, mpsc};

use crate::domain::{ConnectionId, ServerEvent};

/// Transport-derived facts about one connection.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    /// Opaque handle of the connection.
    pub id: ConnectionId,
    /// Origin address of the peer.
    pub remote_ip: IpAddr,
    /// `User-Agent` header of the upgrade request, if any.
    pub user_agent: Option<String>,
    /// When the connection was accepted.
    pub connected_at: DateTime<Utc>,
}

impl ConnectionContext {
    /// Creates a context for a freshly accepted connection.
    #[must_use]
    pub fn new(remote_ip: IpAddr, user_agent: Option<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            remote_ip,
            user_agent,
            connected_at: Utc::now(),
        }
    }
}

/// Open connections indexed by [`ConnectionId`].
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<ConnectionId, mpsc::Sender<ServerEvent>>>,
}

impl PeerRegistry {
    /// Creates an empty peer registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a connection and the sender side of its outbound queue.
    pub async fn add(&self, id: ConnectionId, tx: mpsc::Sender<ServerEvent>) {
        let mut peers = self.peers.write().await;
        let _ = peers.insert(id, tx);
    }

    /// Forgets a connection. Returns `false` if it was not known.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        self.peers.write().await.remove(&id).is_some()
    }

    /// Queues `event` for one connection without waiting.
    ///
    /// Returns `false` if the connection is unknown, closed, or its queue is
    /// full; the event is dropped in that case.
    pub async fn send_to(&self, id: ConnectionId, event: ServerEvent) -> bool {
        let peers = self.peers.read().await;
        let Some(tx) = peers.get(&id) else {
            tracing::debug!(conn_id = %id, event = event.event_name(), "send to unknown connection");
            return false;
        };
        let event_name = event.event_name();
        match tx.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %id, event = event_name, "outbound queue full, event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!(conn_id = %id, event = event_name, "outbound queue closed");
                false
            }
        }
    }

    /// Returns `true` if the connection is currently open.
    pub async fn contains(&self, id: ConnectionId) -> bool {
        self.peers.read().await.contains_key(&id)
    }

    /// Number of open connections.
    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Returns `true` if no connection is open.
    pub async fn is_empty(&self) -> bool {
        self.peers.read().await.is_empty()
    }
}
