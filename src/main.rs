//! canvas-relay server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket canvas and the REST
//! introspection endpoints.

use tracing_subscriber::EnvFilter;

use canvas_relay::app::build_app;
use canvas_relay::app_state::AppState;
use canvas_relay::config::{LogFormat, RelayConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = RelayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting canvas-relay");

    // Build application state and router
    let app_state = AppState::new(&config);
    let app = build_app(app_state, &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
