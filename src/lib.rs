//! # session-hub
//!
//! Real-time relay between remote agents and an operator console.
//!
//! Agents register under an opaque `session_id` over a WebSocket; operators
//! on the same endpoint watch the live session list and dispatch commands to
//! a specific agent. Results come back asynchronously and are broadcast to
//! every connection.
//!
//! ## Architecture
//!
//! ```text
//! Agents / Operators (WebSocket)      Dashboard, REST
//!     │                                   │
//!     ├── WS Handler (ws/)                ├── REST Handlers (api/)
//!     │     └── PeerRegistry (targeted)   │
//!     │                                   │
//!     ├── EventRouter (service/) ─────────┘
//!     │     ├── SessionRegistry (domain/)
//!     │     └── BroadcastEmitter (service/)
//!     │
//!     └── EventBus (domain/) ── fan-out to every connection
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
