//! WebSocket layer: upgrade handling, the per-connection loop, frame codec.
//!
//! The WebSocket endpoint at `/ws` is the canvas: every connection is one
//! participant, exchanging draw and cursor events with all the others.

pub mod connection;
pub mod handler;
pub mod messages;
