//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection:
//! decoding inbound frames and routing them, draining the connection's
//! targeted queue, and forwarding hub-wide broadcasts.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};

use super::messages::ClientEvent;
use super::peers::ConnectionContext;
use crate::domain::ServerEvent;
use crate::error::HubError;
use crate::service::EventRouter;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads events from the client and hands them to the [`EventRouter`].
/// - Writes events queued for this connection.
/// - Forwards every event from the [`broadcast::Receiver`].
///
/// When the socket closes the router is told to drop whatever the
/// connection owned.
pub async fn run_connection(
    socket: WebSocket,
    ctx: ConnectionContext,
    mut event_rx: broadcast::Receiver<ServerEvent>,
    router: Arc<EventRouter>,
    outbound_capacity: usize,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (direct_tx, mut direct_rx) = mpsc::channel::<ServerEvent>(outbound_capacity.max(1));
    router.handle_connect(&ctx, direct_tx).await;

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_message(text.as_str(), &ctx, &router).await;
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let err = HubError::MalformedMessage(
                            "binary frames are not supported".to_string(),
                        );
                        router.reject(&ctx, &err).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(conn_id = %ctx.id, error = %e, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Event addressed to this connection only
            Some(event) = direct_rx.recv() => {
                if send_event(&mut ws_tx, &event).await.is_err() {
                    break;
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if send_event(&mut ws_tx, &event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(conn_id = %ctx.id, lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    let _ = router.handle_disconnect(&ctx).await;
    tracing::debug!(conn_id = %ctx.id, "ws connection closed");
}

/// Decodes a text frame and routes it, reporting undecodable frames back to
/// the sender.
async fn handle_text_message(text: &str, ctx: &ConnectionContext, router: &EventRouter) {
    match ClientEvent::parse(text) {
        Ok(event) => router.dispatch(ctx, event).await,
        Err(err) => router.reject(ctx, &err).await,
    }
}

/// Serializes `event` and writes it as a text frame.
async fn send_event<S>(ws_tx: &mut S, event: &ServerEvent) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(event = event.event_name(), error = %e, "failed to serialize event");
            return Ok(());
        }
    };
    ws_tx.send(Message::text(json)).await
}
