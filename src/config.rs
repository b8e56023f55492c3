//! Relay configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Top-level relay configuration.
///
/// Loaded once at startup via [`RelayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Log output format.
    pub log_format: LogFormat,

    /// Largest inbound WebSocket message accepted, in bytes.
    pub ws_max_message_bytes: usize,

    /// Allow cross-origin requests from any origin.
    pub cors_permissive: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            log_format: LogFormat::Pretty,
            ws_max_message_bytes: 64 * 1024,
            cors_permissive: true,
        }
    }
}

impl RelayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid LISTEN_ADDR {raw:?}: {e}"))?,
            Err(_) => defaults.listen_addr,
        };

        let log_format = parse_log_format(std::env::var("LOG_FORMAT").ok().as_deref());

        let ws_max_message_bytes = parse_env("WS_MAX_MESSAGE_BYTES", defaults.ws_max_message_bytes);
        let cors_permissive = parse_env_bool("CORS_PERMISSIVE", defaults.cors_permissive);

        Ok(Self {
            listen_addr,
            log_format,
            ws_max_message_bytes,
            cors_permissive,
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Maps a `LOG_FORMAT` value to a [`LogFormat`]. `"json"` in any case
/// selects JSON; anything else, or no value, selects pretty output.
fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw {
        Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().as_deref() {
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => true,
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
        _ => default,
    }
}
