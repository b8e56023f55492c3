//! WebSocket connection loop.
//!
//! Drives a single connection from activation to teardown: reads client
//! frames and routes them, and drains the connection's outbound queue onto
//! the socket.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{Inbound, decode_client_message, encode_server_event};
use crate::app_state::AppState;
use crate::domain::{ConnectionId, ServerEvent};
use crate::service::ConnectionState;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Registers the connection and sends its greeting.
/// - Reads client frames and hands valid ones to the event router.
/// - Forwards queued [`ServerEvent`]s to the client.
/// - On close or transport error, runs the same disconnect cleanup.
pub async fn run_connection(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let mut phase = ConnectionState::Connecting;
    tracing::trace!(state = %phase, "ws upgrade complete");
    let id = state.lifecycle.connect(outbound_tx).await;
    phase.advance(ConnectionState::Active);
    tracing::debug!(conn_id = %id, state = %phase, "ws connection active");

    let reason = loop {
        tokio::select! {
            // Incoming frame from the client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        handle_text_message(&state, id, text.as_str()).await;
                    }
                    Some(Ok(Message::Binary(data))) => {
                        tracing::debug!(conn_id = %id, bytes = data.len(), "binary frame ignored");
                    }
                    Some(Ok(Message::Close(_))) | None => break "closed",
                    Some(Err(error)) => {
                        tracing::debug!(conn_id = %id, %error, "ws receive failed");
                        break "receive error";
                    }
                    Some(Ok(_)) => {}
                }
            }
            // Event queued for this client
            event = outbound_rx.recv() => {
                let Some(event) = event else {
                    break "outbound queue closed";
                };
                match encode_server_event(&event) {
                    Ok(json) => {
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break "send error";
                        }
                    }
                    Err(error) => {
                        tracing::warn!(conn_id = %id, event = event.event_name(), %error, "dropping unencodable event");
                    }
                }
            }
        }
    };

    if phase.advance(ConnectionState::Disconnected) {
        state.lifecycle.disconnect(id).await;
    }
    tracing::debug!(conn_id = %id, state = %phase, reason, "ws connection closed");
}

/// Decodes one text frame from `sender` and routes it.
///
/// Malformed frames are logged and dropped; the connection stays open.
async fn handle_text_message(state: &AppState, sender: ConnectionId, text: &str) {
    match decode_client_message(text) {
        Ok(Inbound::Event(event)) => {
            state.router.dispatch(sender, event).await;
        }
        Ok(Inbound::Ignored(name)) => {
            tracing::debug!(conn_id = %sender, event = %name, "unhandled event ignored");
        }
        Err(error) => {
            tracing::warn!(conn_id = %sender, %error, "malformed message ignored");
        }
    }
}
