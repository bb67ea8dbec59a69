//! session-hub server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket relay, REST endpoints
//! and the operator dashboard.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use session_hub::config::{HubConfig, LogFormat};
use session_hub::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = HubConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(addr = %config.listen_addr, "starting session-hub");
    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY is not set; using the built-in default");
    }

    let state = server::build_state(&config);
    let app = server::build_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    server::serve(listener, app, server::shutdown_signal())
        .await
        .context("running server")?;

    Ok(())
}
