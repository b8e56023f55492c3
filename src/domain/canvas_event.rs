//! Events exchanged with connected clients.
//!
//! [`ClientEvent`] is what a client may send after decoding and field
//! validation; [`ServerEvent`] is what the server pushes. Every server
//! variant serializes as `{"event": "<name>", "data": <payload>}`
//! with camelCase event and field names, matching what the browser client
//! listens for.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Color, ConnectionId, Position, User};

/// One line segment of a stroke.
///
/// Forwarded verbatim: coordinates are not bounds-checked and the color is
/// not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawSegment {
    /// Segment start, horizontal.
    pub prev_x: f64,
    /// Segment start, vertical.
    pub prev_y: f64,
    /// Segment end, horizontal.
    #[serde(alias = "currentX")]
    pub x: f64,
    /// Segment end, vertical.
    #[serde(alias = "currentY")]
    pub y: f64,
    /// Stroke color as chosen by the drawing client.
    pub color: Color,
}

/// Identity and color of a participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserColor {
    /// Connection the color belongs to.
    pub user_id: ConnectionId,
    /// The assigned color.
    pub color: Color,
}

/// Client → server event, already validated.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// One segment of a stroke, to be relayed to everyone else.
    Draw(DrawSegment),
    /// The sender's cursor moved.
    CursorMove(Position),
}

/// Server → client event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Sent to a newcomer only: its own id and color.
    UserColor(UserColor),

    /// Sent to everyone else when a participant joins.
    UserConnected(UserColor),

    /// Sent to a newcomer only: every other participant's state.
    InitialPositions(HashMap<ConnectionId, User>),

    /// A stroke segment drawn by another participant.
    Draw(DrawSegment),

    /// Another participant moved their cursor.
    #[serde(rename_all = "camelCase")]
    CursorMove {
        /// Who moved.
        user_id: ConnectionId,
        /// Where to.
        position: Position,
    },

    /// A participant left; carries their id.
    UserDisconnected(ConnectionId),
}

impl ServerEvent {
    /// Returns the wire event name.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::UserColor(_) => "userColor",
            Self::UserConnected(_) => "userConnected",
            Self::InitialPositions(_) => "initialPositions",
            Self::Draw(_) => "draw",
            Self::CursorMove { .. } => "cursorMove",
            Self::UserDisconnected(_) => "userDisconnected",
        }
    }
}
