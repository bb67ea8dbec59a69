//! End-to-end tests driving the hub with real WebSocket and HTTP clients.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;

use session_hub::config::HubConfig;
use session_hub::server;
use session_hub::ws::messages::WireMessage;

const TIMEOUT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(200);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Boot a hub on an ephemeral port and return its address.
async fn boot_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = server::build_app(server::build_state(&HubConfig::default()));
    tokio::spawn(server::serve(listener, app, std::future::pending()));
    addr
}

async fn connect(addr: SocketAddr, user_agent: Option<&'static str>) -> WsStream {
    let mut request = format!("ws://{addr}/ws").into_client_request().unwrap();
    if let Some(ua) = user_agent {
        request
            .headers_mut()
            .insert("User-Agent", HeaderValue::from_static(ua));
    }
    let (ws, _) = timeout(TIMEOUT, connect_async(request))
        .await
        .expect("connect timed out")
        .unwrap();
    ws
}

async fn send(ws: &mut WsStream, event: &str, data: Value) {
    let text = WireMessage::new(event, data).to_text().unwrap();
    ws.send(Message::Text(text.into())).await.unwrap();
}

/// Read the next text frame as an envelope.
async fn recv(ws: &mut WsStream) -> WireMessage {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Read frames until one named `event` arrives; return its data.
async fn recv_named(ws: &mut WsStream, event: &str) -> Value {
    loop {
        let msg = recv(ws).await;
        if msg.event == event {
            return msg.data;
        }
    }
}

/// Assert no frame named `event` arrives within a short window.
async fn assert_no_event(ws: &mut WsStream, event: &str) {
    let deadline = tokio::time::Instant::now() + QUIET;
    while let Ok(Some(Ok(msg))) = tokio::time::timeout_at(deadline, ws.next()).await {
        if let Message::Text(text) = msg {
            let wire: WireMessage = serde_json::from_str(text.as_str()).unwrap();
            assert_ne!(wire.event, event, "unexpected {event}: {}", wire.data);
        }
    }
}

#[tokio::test]
async fn full_command_round_trip() {
    let addr = boot_server().await;
    let mut operator = connect(addr, Some("dashboard")).await;
    let mut agent = connect(addr, Some("agent/1.0")).await;

    send(
        &mut agent,
        "register",
        json!({"session_id": "bot1", "info": {"os": "linux"}}),
    )
    .await;
    assert_eq!(recv_named(&mut agent, "registered").await, json!({"status": "ok"}));
    assert_eq!(
        recv_named(&mut operator, "sessions_update").await,
        json!({
            "bot1": {"ip": "127.0.0.1", "user_agent": "agent/1.0", "data": {"os": "linux"}}
        })
    );

    send(
        &mut operator,
        "command",
        json!({"session_id": "bot1", "command": "whoami", "payload": ""}),
    )
    .await;
    assert_eq!(
        recv_named(&mut agent, "command").await,
        json!({"cmd": "whoami", "payload": ""})
    );
    assert_eq!(
        recv_named(&mut operator, "command_status").await,
        json!({"status": "sent", "session_id": "bot1", "command": "whoami"})
    );

    send(
        &mut agent,
        "command_result",
        json!({"session_id": "bot1", "result": "root"}),
    )
    .await;
    let expected = json!({"session_id": "bot1", "result": "root"});
    assert_eq!(recv_named(&mut operator, "command_result").await, expected);
    assert_eq!(recv_named(&mut agent, "command_result").await, expected);

    agent.close(None).await.unwrap();
    assert_eq!(recv_named(&mut operator, "sessions_update").await, json!({}));
}

#[tokio::test]
async fn command_to_unknown_session_reports_not_found() {
    let addr = boot_server().await;
    let mut operator = connect(addr, None).await;

    send(
        &mut operator,
        "command",
        json!({"session_id": "ghost", "command": "whoami"}),
    )
    .await;
    assert_eq!(
        recv_named(&mut operator, "command_status").await,
        json!({"status": "error", "message": "Session ghost not found"})
    );
}

#[tokio::test]
async fn command_without_target_is_rejected() {
    let addr = boot_server().await;
    let mut operator = connect(addr, None).await;

    send(&mut operator, "command", json!({"command": "whoami"})).await;
    assert_eq!(
        recv_named(&mut operator, "command_status").await,
        json!({"status": "error", "message": "Missing session_id or command"})
    );
}

#[tokio::test]
async fn register_without_session_id_is_rejected() {
    let addr = boot_server().await;
    let mut observer = connect(addr, None).await;
    let mut agent = connect(addr, None).await;

    send(&mut agent, "register", json!({"info": {"os": "linux"}})).await;
    assert_eq!(
        recv_named(&mut agent, "error").await,
        json!({"message": "session_id is required"})
    );
    assert_no_event(&mut observer, "sessions_update").await;
}

#[tokio::test]
async fn unregistered_disconnect_broadcasts_nothing() {
    let addr = boot_server().await;
    let mut observer = connect(addr, None).await;
    let mut operator = connect(addr, None).await;

    operator.close(None).await.unwrap();
    assert_no_event(&mut observer, "sessions_update").await;
}

#[tokio::test]
async fn stale_connection_disconnect_keeps_new_owner() {
    let addr = boot_server().await;
    let mut observer = connect(addr, None).await;
    let mut first = connect(addr, Some("first")).await;
    let mut second = connect(addr, Some("second")).await;

    send(&mut first, "register", json!({"session_id": "A"})).await;
    let _ = recv_named(&mut first, "registered").await;
    let _ = recv_named(&mut observer, "sessions_update").await;

    send(&mut second, "register", json!({"session_id": "A"})).await;
    let _ = recv_named(&mut second, "registered").await;
    let update = recv_named(&mut observer, "sessions_update").await;
    assert_eq!(update.pointer("/A/user_agent"), Some(&json!("second")));

    first.close(None).await.unwrap();
    assert_no_event(&mut observer, "sessions_update").await;

    let sessions: Value = reqwest::get(format!("http://{addr}/api/v1/sessions"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sessions.pointer("/A/user_agent"), Some(&json!("second")));
}

#[tokio::test]
async fn malformed_frames_get_an_error_reply() {
    let addr = boot_server().await;
    let mut client = connect(addr, None).await;

    client
        .send(Message::Text("definitely not json".into()))
        .await
        .unwrap();
    let data = recv_named(&mut client, "error").await;
    let message = data.get("message").and_then(Value::as_str).unwrap();
    assert!(message.starts_with("malformed message:"), "{message}");

    send(&mut client, "teleport", json!({})).await;
    assert_eq!(
        recv_named(&mut client, "error").await,
        json!({"message": "unknown event: teleport"})
    );

    // The connection is still usable afterwards.
    send(&mut client, "register", json!({"session_id": "still-alive"})).await;
    assert_eq!(recv_named(&mut client, "registered").await, json!({"status": "ok"}));
}

#[tokio::test]
async fn rest_endpoints_reflect_registry() {
    let addr = boot_server().await;
    let http = reqwest::Client::new();

    let health: Value = http
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.get("status"), Some(&json!("healthy")));
    assert_eq!(health.get("sessions"), Some(&json!(0)));

    let missing = http
        .get(format!("http://{addr}/api/v1/sessions/ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body.pointer("/error/code"), Some(&json!(2001)));
    assert_eq!(
        body.pointer("/error/message"),
        Some(&json!("Session ghost not found"))
    );

    let mut agent = connect(addr, Some("agent/2.0")).await;
    send(&mut agent, "register", json!({"session_id": "bot7"})).await;
    let _ = recv_named(&mut agent, "registered").await;

    let detail: Value = http
        .get(format!("http://{addr}/api/v1/sessions/bot7"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail.get("session_id"), Some(&json!("bot7")));
    assert_eq!(detail.pointer("/info/user_agent"), Some(&json!("agent/2.0")));
    assert_eq!(detail.pointer("/info/data"), Some(&json!({})));
    assert!(detail.get("registered_at").is_some());
    assert!(detail.get("connection").is_none());

    let dashboard = http.get(format!("http://{addr}/")).send().await.unwrap();
    assert!(dashboard.status().is_success());
    let page = dashboard.text().await.unwrap();
    assert!(page.contains("/ws"));
    assert!(page.contains("/api/v1/sessions"), "dashboard seeds its table over REST");
}
