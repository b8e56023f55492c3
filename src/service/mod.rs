//! Service layer: connection lifecycle and event routing.

pub mod event_router;
pub mod lifecycle;

pub use event_router::EventRouter;
pub use lifecycle::{ConnectionLifecycle, ConnectionState};
