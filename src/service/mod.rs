//! Service layer: event routing and broadcast.
//!
//! [`EventRouter`] owns the session registry and turns connection events
//! into registry operations; [`BroadcastEmitter`] publishes the resulting
//! state through the [`super::domain::EventBus`].

pub mod broadcast;
pub mod event_router;

pub use broadcast::BroadcastEmitter;
pub use event_router::EventRouter;
