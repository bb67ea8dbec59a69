//! WebSocket layer: connection handling, message decoding, targeted delivery.
//!
//! The WebSocket endpoint at `/ws` is the hub's only event transport. Agents
//! and operators use it alike; only the events they send differ.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod peers;
