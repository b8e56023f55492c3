//! # canvas-relay
//!
//! WebSocket relay for a real-time collaborative drawing canvas.
//!
//! Every browser client holds one WebSocket connection. The relay assigns
//! each participant a color, forwards stroke segments and cursor moves to
//! everyone else, and keeps an in-memory registry of who is connected and
//! where their cursor last was. Nothing is persisted: the canvas itself
//! lives only in the clients.
//!
//! ## Architecture
//!
//! ```text
//! Browser clients (WebSocket /ws)      HTTP (/health, /api/v1/users)
//!     │                                    │
//!     ├── ws::connection (one task per client)
//!     │       │
//!     │       ├── ConnectionLifecycle (service/)  join / leave
//!     │       └── EventRouter (service/)          draw / cursorMove
//!     │
//!     ├── SessionRegistry (domain/)  id → { position, color }
//!     └── PeerTable (domain/)        id → outbound queue
//! ```

pub mod api;
pub mod app;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
