//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::{ColorAssigner, PeerTable, RandomColorAssigner, SessionRegistry};
use crate::service::{ConnectionLifecycle, EventRouter};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registry of connected users.
    pub registry: Arc<SessionRegistry>,
    /// Join/leave orchestration.
    pub lifecycle: ConnectionLifecycle<PeerTable>,
    /// Draw and cursor fan-out.
    pub router: EventRouter<PeerTable>,
    /// Largest inbound WebSocket message accepted, in bytes.
    pub ws_max_message_bytes: usize,
}

impl AppState {
    /// Builds fresh state with random color assignment.
    #[must_use]
    pub fn new(config: &RelayConfig) -> Self {
        Self::with_colors(config, Arc::new(RandomColorAssigner::new()))
    }

    /// Builds fresh state using the given color assigner.
    #[must_use]
    pub fn with_colors(config: &RelayConfig, colors: Arc<dyn ColorAssigner>) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let peers = Arc::new(PeerTable::new());
        let lifecycle =
            ConnectionLifecycle::new(Arc::clone(&registry), Arc::clone(&peers), colors);
        let router = EventRouter::new(Arc::clone(&registry), Arc::clone(&peers));
        Self {
            registry,
            lifecycle,
            router,
            ws_max_message_bytes: config.ws_max_message_bytes,
        }
    }
}
