//! Domain layer: identities, user state, the session registry and fan-out.
//!
//! This module holds the server-side model of a shared canvas session:
//! connection identity, per-user cursor state and color, the registry of
//! connected users, the outbound event catalogue and the peer table that
//! delivers those events.

pub mod canvas_event;
pub mod color;
pub mod connection_id;
pub mod peer_table;
pub mod session_registry;
pub mod user;

pub use canvas_event::{ClientEvent, DrawSegment, ServerEvent, UserColor};
pub use color::{ColorAssigner, FixedColorAssigner, RandomColorAssigner};
pub use connection_id::ConnectionId;
pub use peer_table::{Broadcaster, PeerSender, PeerTable};
pub use session_registry::SessionRegistry;
pub use user::{Color, Position, User};
