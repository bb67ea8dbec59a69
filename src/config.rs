//! Hub configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

/// Signing secret used when `SECRET_KEY` is not set.
pub const DEFAULT_SECRET_KEY: &str = "default-secret-key-change-in-production";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level hub configuration.
///
/// Loaded once at startup via [`HubConfig::from_env`].
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:10000`).
    pub listen_addr: SocketAddr,

    /// Secret/signing key. Not used for authentication.
    pub secret_key: String,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Capacity of each connection's targeted outbound queue.
    pub outbound_queue_capacity: usize,

    /// Tracing output format.
    pub log_format: LogFormat,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 10_000)),
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            event_bus_capacity: 1024,
            outbound_queue_capacity: 256,
            log_format: LogFormat::Text,
        }
    }
}

impl HubConfig {
    /// Loads configuration from environment variables.
    ///
    /// `LISTEN_ADDR` wins over `HOST`/`PORT`. Numeric settings fall back to
    /// their defaults when missing or unparsable. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address cannot be parsed as a
    /// [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the listen address cannot be parsed as a
    /// [`SocketAddr`].
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let listen_addr: SocketAddr = match lookup("LISTEN_ADDR") {
            Some(addr) => addr.parse()?,
            None => {
                let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
                let port: u16 = parse_or(&lookup, "PORT", defaults.listen_addr.port());
                format!("{host}:{port}").parse()?
            }
        };

        let secret_key = lookup("SECRET_KEY")
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.secret_key);

        let event_bus_capacity =
            parse_or(&lookup, "EVENT_BUS_CAPACITY", defaults.event_bus_capacity);
        let outbound_queue_capacity = parse_or(
            &lookup,
            "OUTBOUND_QUEUE_CAPACITY",
            defaults.outbound_queue_capacity,
        );

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            secret_key,
            event_bus_capacity,
            outbound_queue_capacity,
            log_format,
        })
    }

    /// Returns `true` if the built-in secret is still in use.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

/// Parses a looked-up value as `T`, returning `default` on missing or
/// invalid values.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}
