//! Outbound fan-out to connected peers.
//!
//! [`Broadcaster`] is the transport capability the lifecycle manager and
//! the event router deliver through. [`PeerTable`] implements it with one
//! unbounded [`mpsc`] channel per connection; each connection task drains
//! its own channel onto the socket, so a slow socket only delays itself.
//!
//! There is no flow control: a peer that never drains its channel buffers
//! without bound until its connection closes.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tokio::sync::mpsc;

use super::{ConnectionId, ServerEvent};

/// Sending half of a connection's outbound queue.
pub type PeerSender = mpsc::UnboundedSender<ServerEvent>;

/// Best-effort delivery of [`ServerEvent`]s to connections.
///
/// All sends are fire-and-forget. Delivering to a connection that has
/// already closed, or was never registered, is silently skipped.
/// `broadcast_except` and `broadcast_all` are the only fan-out primitives.
pub trait Broadcaster: Send + Sync {
    /// Starts delivering events for `id` into `sender`.
    fn register(&self, id: ConnectionId, sender: PeerSender);

    /// Stops delivering events for `id`. Returns `false` if it was unknown.
    fn unregister(&self, id: ConnectionId) -> bool;

    /// Sends `event` to every registered connection except `sender`.
    ///
    /// Returns how many connections the event was queued for.
    fn broadcast_except(&self, sender: ConnectionId, event: &ServerEvent) -> usize;

    /// Sends `event` to every registered connection.
    ///
    /// Returns how many connections the event was queued for.
    fn broadcast_all(&self, event: &ServerEvent) -> usize;
}

/// Connection id → outbound channel.
#[derive(Debug, Default)]
pub struct PeerTable {
    peers: RwLock<HashMap<ConnectionId, PeerSender>>,
}

impl PeerTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fan_out(&self, skip: Option<ConnectionId>, event: &ServerEvent) -> usize {
        let peers = self.peers.read().unwrap_or_else(PoisonError::into_inner);
        let mut delivered = 0;
        for (id, tx) in peers.iter() {
            if Some(*id) == skip {
                continue;
            }
            if tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }
}

impl Broadcaster for PeerTable {
    fn register(&self, id: ConnectionId, sender: PeerSender) {
        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, sender);
    }

    fn unregister(&self, id: ConnectionId) -> bool {
        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some()
    }

    fn broadcast_except(&self, sender: ConnectionId, event: &ServerEvent) -> usize {
        self.fan_out(Some(sender), event)
    }

    fn broadcast_all(&self, event: &ServerEvent) -> usize {
        self.fan_out(None, event)
    }
}
