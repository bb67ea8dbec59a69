//! Axum WebSocket upgrade handler.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use axum::http::header::USER_AGENT;
use axum::response::IntoResponse;

use super::connection::run_connection;
use super::peers::ConnectionContext;
use crate::app_state::AppState;

/// `GET /ws`: Upgrade HTTP connection to WebSocket.
///
/// Agents and operators connect the same way; the origin address and the
/// `User-Agent` header become the connection-derived session fields.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let ctx = ConnectionContext::new(remote.ip(), user_agent);
    let event_rx = state.router.event_bus().subscribe();
    let router = Arc::clone(&state.router);
    let outbound_capacity = state.outbound_queue_capacity;

    ws.on_upgrade(move |socket| run_connection(socket, ctx, event_rx, router, outbound_capacity))
}
