//! Connection lifecycle: join and leave handling.
//!
//! Each connection goes `Connecting → Active → Disconnected`. Becoming
//! active assigns a color, tells the newcomer its own identity and the
//! current room state, and announces the newcomer to everyone else.
//! Disconnecting removes the user and announces the departure.

use std::fmt;
use std::sync::Arc;

use crate::domain::session_registry::join_locked;
use crate::domain::{
    Broadcaster, ColorAssigner, ConnectionId, PeerSender, ServerEvent, SessionRegistry, UserColor,
};

/// Per-connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport handshake in progress; no registry entry yet.
    Connecting,
    /// Registered and exchanging events.
    Active,
    /// Terminal. Registry entry removed and departure announced.
    Disconnected,
}

impl ConnectionState {
    /// Moves to `next` if `self → next` is a legal transition.
    ///
    /// Legal moves are `Connecting → Active` and any non-terminal state to
    /// `Disconnected`. Returns `false` and leaves the state unchanged
    /// otherwise.
    pub fn advance(&mut self, next: Self) -> bool {
        let legal = matches!(
            (*self, next),
            (Self::Connecting, Self::Active)
                | (Self::Connecting | Self::Active, Self::Disconnected)
        );
        if legal {
            *self = next;
        }
        legal
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Active => "active",
            Self::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}

/// Orchestrates the registry, the color assigner and the broadcaster on
/// connect and disconnect.
#[derive(Debug)]
pub struct ConnectionLifecycle<B> {
    registry: Arc<SessionRegistry>,
    peers: Arc<B>,
    colors: Arc<dyn ColorAssigner>,
}

impl<B> Clone for ConnectionLifecycle<B> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            peers: Arc::clone(&self.peers),
            colors: Arc::clone(&self.colors),
        }
    }
}

impl<B: Broadcaster> ConnectionLifecycle<B> {
    /// Creates a lifecycle manager over shared state.
    #[must_use]
    pub fn new(
        registry: Arc<SessionRegistry>,
        peers: Arc<B>,
        colors: Arc<dyn ColorAssigner>,
    ) -> Self {
        Self {
            registry,
            peers,
            colors,
        }
    }

    /// Activates a new connection whose outbound events go to `outbound`.
    ///
    /// The newcomer's queue always starts with `userColor` followed by
    /// `initialPositions`: both are pushed onto `outbound` before the
    /// channel is registered with the broadcaster, so no fan-out can get
    /// ahead of them. Every other peer then receives `userConnected`. The
    /// whole join runs under the registry lock, so concurrent joins are
    /// totally ordered.
    pub async fn connect(&self, outbound: PeerSender) -> ConnectionId {
        let id = ConnectionId::new();
        let color = self.colors.assign();
        let greeting = UserColor {
            user_id: id,
            color: color.clone(),
        };

        let (others, notified) = {
            let mut users = self.registry.lock().await;
            let others = join_locked(&mut users, id, color.clone());
            let count = others.len();
            if outbound
                .send(ServerEvent::UserColor(greeting.clone()))
                .and_then(|()| outbound.send(ServerEvent::InitialPositions(others)))
                .is_err()
            {
                tracing::trace!(conn_id = %id, "greeting dropped, connection already closed");
            }
            self.peers.register(id, outbound);
            let notified = self
                .peers
                .broadcast_except(id, &ServerEvent::UserConnected(greeting));
            (count, notified)
        };

        tracing::info!(conn_id = %id, %color, others, notified, "user connected");
        id
    }

    /// Tears down connection `id` and tells everyone still connected.
    ///
    /// Safe to call for an id that was never fully connected: missing
    /// registry and peer entries are skipped.
    pub async fn disconnect(&self, id: ConnectionId) {
        let removed = {
            let mut users = self.registry.lock().await;
            let removed = users.remove(&id);
            self.peers.unregister(id);
            removed
        };

        let notified = self
            .peers
            .broadcast_all(&ServerEvent::UserDisconnected(id));

        if removed.is_some() {
            tracing::info!(conn_id = %id, notified, "user disconnected");
        } else {
            tracing::debug!(conn_id = %id, notified, "disconnect for unregistered connection");
        }
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &SessionRegistry {
        &self.registry
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{Color, DrawSegment, FixedColorAssigner, PeerTable, Position, User};

    type Rx = mpsc::UnboundedReceiver<ServerEvent>;

    fn lifecycle() -> ConnectionLifecycle<PeerTable> {
        ConnectionLifecycle::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(PeerTable::new()),
            Arc::new(FixedColorAssigner::new(["cx", "cy", "cz"])),
        )
    }

    async fn join(lc: &ConnectionLifecycle<PeerTable>) -> (ConnectionId, Rx) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = lc.connect(tx).await;
        (id, rx)
    }

    fn drain(rx: &mut Rx) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn first_user_gets_color_and_empty_snapshot() {
        let lc = lifecycle();
        let (x, mut rx) = join(&lc).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        let Some(ServerEvent::UserColor(greeting)) = events.first() else {
            panic!("first event should be userColor, got {events:?}");
        };
        assert_eq!(greeting.user_id, x);
        assert_eq!(greeting.color.as_str(), "cx");
        let Some(ServerEvent::InitialPositions(snapshot)) = events.get(1) else {
            panic!("second event should be initialPositions, got {events:?}");
        };
        assert!(snapshot.is_empty());
    }

    #[tokio::test]
    async fn second_user_sees_first_and_first_is_notified() {
        let lc = lifecycle();
        let (x, mut rx_x) = join(&lc).await;
        drain(&mut rx_x);
        let (y, mut rx_y) = join(&lc).await;

        let events_y = drain(&mut rx_y);
        let Some(ServerEvent::InitialPositions(snapshot)) = events_y.get(1) else {
            panic!("expected initialPositions, got {events_y:?}");
        };
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot.get(&x),
            Some(&User::new(Color::new("cx")))
        );

        let events_x = drain(&mut rx_x);
        let [ServerEvent::UserConnected(notice)] = events_x.as_slice() else {
            panic!("expected a single userConnected, got {events_x:?}");
        };
        assert_eq!(notice.user_id, y);
        assert_eq!(notice.color.as_str(), "cy");
    }

    #[tokio::test]
    async fn snapshot_carries_known_positions() {
        let lc = lifecycle();
        let (x, _rx_x) = join(&lc).await;
        lc.registry()
            .update_position(x, Position::new(5.0, 6.0))
            .await;

        let (_y, mut rx_y) = join(&lc).await;
        let events = drain(&mut rx_y);
        let Some(ServerEvent::InitialPositions(snapshot)) = events.get(1) else {
            panic!("expected initialPositions, got {events:?}");
        };
        assert_eq!(
            snapshot.get(&x).and_then(|u| u.position),
            Some(Position::new(5.0, 6.0))
        );
    }

    #[tokio::test]
    async fn disconnect_removes_and_notifies_remaining() {
        let lc = lifecycle();
        let (x, _rx_x) = join(&lc).await;
        let (y, mut rx_y) = join(&lc).await;
        let (z, mut rx_z) = join(&lc).await;
        drain(&mut rx_y);
        drain(&mut rx_z);

        lc.disconnect(x).await;

        assert!(!lc.registry().contains(x).await);
        assert!(lc.registry().contains(y).await);
        assert!(lc.registry().contains(z).await);
        for rx in [&mut rx_y, &mut rx_z] {
            assert_eq!(drain(rx), vec![ServerEvent::UserDisconnected(x)]);
        }
    }

    #[tokio::test]
    async fn disconnect_of_unknown_connection_is_harmless() {
        let lc = lifecycle();
        let (_x, mut rx_x) = join(&lc).await;
        drain(&mut rx_x);

        let ghost = ConnectionId::new();
        lc.disconnect(ghost).await;
        lc.disconnect(ghost).await;

        assert_eq!(lc.registry().len().await, 1);
        assert_eq!(drain(&mut rx_x).len(), 2);
    }

    #[tokio::test]
    async fn registry_matches_open_connections() {
        let lc = lifecycle();
        let mut open = Vec::new();
        for round in 0..6 {
            let (id, rx) = join(&lc).await;
            open.push((id, rx));
            if round % 3 == 2 {
                let (gone, _) = open.remove(0);
                lc.disconnect(gone).await;
            }
        }

        let snapshot = lc.registry().snapshot().await;
        assert_eq!(snapshot.len(), open.len());
        for (id, _) in &open {
            assert!(snapshot.contains_key(id));
        }
    }

    /// Peer table that relays a stroke from `drawer` to every registered
    /// peer the moment a new peer is registered.
    #[derive(Debug)]
    struct DrawOnRegister {
        inner: PeerTable,
        drawer: ConnectionId,
    }

    impl Broadcaster for DrawOnRegister {
        fn register(&self, id: ConnectionId, sender: PeerSender) {
            self.inner.register(id, sender);
            let segment = DrawSegment {
                prev_x: 0.0,
                prev_y: 0.0,
                x: 1.0,
                y: 1.0,
                color: Color::new("#000"),
            };
            self.inner
                .broadcast_except(self.drawer, &ServerEvent::Draw(segment));
        }

        fn unregister(&self, id: ConnectionId) -> bool {
            self.inner.unregister(id)
        }

        fn broadcast_except(&self, sender: ConnectionId, event: &ServerEvent) -> usize {
            self.inner.broadcast_except(sender, event)
        }

        fn broadcast_all(&self, event: &ServerEvent) -> usize {
            self.inner.broadcast_all(event)
        }
    }

    #[tokio::test]
    async fn greeting_precedes_strokes_relayed_during_join() {
        let lc = ConnectionLifecycle::new(
            Arc::new(SessionRegistry::new()),
            Arc::new(DrawOnRegister {
                inner: PeerTable::new(),
                drawer: ConnectionId::new(),
            }),
            Arc::new(FixedColorAssigner::new(["cx"])),
        );
        let (tx, mut rx) = mpsc::unbounded_channel();
        lc.connect(tx).await;

        let names: Vec<&str> = drain(&mut rx).iter().map(ServerEvent::event_name).collect();
        assert_eq!(names, ["userColor", "initialPositions", "draw"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_connects_see_each_other_once() {
        const JOINERS: usize = 32;
        let lc = lifecycle();
        let mut handles = Vec::new();
        for _ in 0..JOINERS {
            let lc = lc.clone();
            handles.push(tokio::spawn(async move { join(&lc).await }));
        }

        let mut joined = Vec::new();
        for handle in handles {
            let Ok(connection) = handle.await else {
                panic!("connect task failed");
            };
            joined.push(connection);
        }

        // Everyone another connection learned about, via snapshot or notice.
        let mut known: HashMap<ConnectionId, Vec<ConnectionId>> = HashMap::new();
        for (id, rx) in &mut joined {
            let events = drain(rx);
            let [
                ServerEvent::UserColor(own),
                ServerEvent::InitialPositions(snapshot),
                notices @ ..,
            ] = events.as_slice()
            else {
                panic!("greeting out of order: {events:?}");
            };
            assert_eq!(own.user_id, *id);
            let mut seen: Vec<ConnectionId> = snapshot.keys().copied().collect();
            for notice in notices {
                let ServerEvent::UserConnected(other) = notice else {
                    panic!("unexpected event {notice:?}");
                };
                seen.push(other.user_id);
            }
            known.insert(*id, seen);
        }

        for (a, seen) in &known {
            assert_eq!(seen.len(), JOINERS - 1);
            for b in known.keys().filter(|b| *b != a) {
                assert_eq!(seen.iter().filter(|s| *s == b).count(), 1);
            }
        }
        assert_eq!(lc.registry().len().await, JOINERS);
    }

    #[test]
    fn state_advances_forward_only() {
        let mut state = ConnectionState::Connecting;
        assert!(state.advance(ConnectionState::Active));
        assert!(!state.advance(ConnectionState::Connecting));
        assert!(state.advance(ConnectionState::Disconnected));
        assert!(!state.advance(ConnectionState::Disconnected));
        assert_eq!(state, ConnectionState::Disconnected);

        let mut aborted = ConnectionState::Connecting;
        assert!(aborted.advance(ConnectionState::Disconnected));
        assert!(!aborted.advance(ConnectionState::Active));
    }
}
