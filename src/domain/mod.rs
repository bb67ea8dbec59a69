//! Domain layer: session identity, the session registry, and the event system.
//!
//! This module contains the hub's server-side model: opaque connection
//! handles, registered sessions with their metadata, the registry that maps
//! one to the other, and the event bus used to fan events out to every
//! connection.

pub mod connection_id;
pub mod event_bus;
pub mod server_event;
pub mod session;
pub mod session_registry;

pub use connection_id::ConnectionId;
pub use event_bus::EventBus;
pub use server_event::{CommandStatus, ServerEvent};
pub use session::{Session, SessionInfo, SessionSnapshot};
pub use session_registry::SessionRegistry;
