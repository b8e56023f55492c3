//! WebSocket frame codec.
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": ...}`.
//! Inbound frames are validated here, before anything is dispatched:
//! a known event with missing or mistyped fields is an error, an unknown
//! event name is reported as [`Inbound::Ignored`].

use serde::Deserialize;

use crate::domain::{ClientEvent, DrawSegment, Position, ServerEvent};
use crate::error::RelayError;

/// Raw envelope of an inbound frame.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Outcome of decoding one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A valid event to route.
    Event(ClientEvent),
    /// A well-formed frame for an event the server does not handle.
    Ignored(String),
}

/// Decodes one inbound text frame.
///
/// # Errors
///
/// Returns [`RelayError::MalformedMessage`] when the frame is not JSON,
/// lacks an `event` name, or its `data` is missing a required field.
pub fn decode_client_message(text: &str) -> Result<Inbound, RelayError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    let event = match envelope.event.as_str() {
        "draw" => ClientEvent::Draw(serde_json::from_value::<DrawSegment>(envelope.data)?),
        "cursorMove" => ClientEvent::CursorMove(serde_json::from_value::<Position>(envelope.data)?),
        _ => return Ok(Inbound::Ignored(envelope.event)),
    };
    Ok(Inbound::Event(event))
}

/// Encodes an outbound event as a text frame payload.
///
/// # Errors
///
/// Returns [`RelayError::MalformedMessage`] if serialization fails.
pub fn encode_server_event(event: &ServerEvent) -> Result<String, RelayError> {
    Ok(serde_json::to_string(event)?)
}
