//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::EventRouter;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event router owning the session registry.
    pub router: Arc<EventRouter>,
    /// Capacity of each new connection's targeted outbound queue.
    pub outbound_queue_capacity: usize,
}
