//! Relays validated client events to the other participants.

use std::sync::Arc;

use crate::domain::{
    Broadcaster, ClientEvent, ConnectionId, DrawSegment, Position, ServerEvent, SessionRegistry,
};

/// Fan-out of draw and cursor events.
///
/// Stateless apart from the cursor position it records in the
/// [`SessionRegistry`]. Nothing is acknowledged, retried or rate-limited.
#[derive(Debug)]
pub struct EventRouter<B> {
    registry: Arc<SessionRegistry>,
    peers: Arc<B>,
}

impl<B> Clone for EventRouter<B> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            peers: Arc::clone(&self.peers),
        }
    }
}

impl<B: Broadcaster> EventRouter<B> {
    /// Creates a router over shared state.
    #[must_use]
    pub fn new(registry: Arc<SessionRegistry>, peers: Arc<B>) -> Self {
        Self { registry, peers }
    }

    /// Routes one event from `sender`.
    ///
    /// Returns how many connections it was relayed to.
    pub async fn dispatch(&self, sender: ConnectionId, event: ClientEvent) -> usize {
        match event {
            ClientEvent::Draw(segment) => self.draw(sender, segment),
            ClientEvent::CursorMove(position) => self.cursor_move(sender, position).await,
        }
    }

    /// Relays a stroke segment, unchanged, to everyone but `sender`.
    pub fn draw(&self, sender: ConnectionId, segment: DrawSegment) -> usize {
        let relayed = self
            .peers
            .broadcast_except(sender, &ServerEvent::Draw(segment));
        tracing::trace!(conn_id = %sender, relayed, "draw relayed");
        relayed
    }

    /// Records `sender`'s cursor position and relays it to everyone else.
    ///
    /// A sender that is no longer registered is ignored.
    pub async fn cursor_move(&self, sender: ConnectionId, position: Position) -> usize {
        if !self.registry.update_position(sender, position).await {
            tracing::debug!(conn_id = %sender, "cursor move from unregistered connection");
            return 0;
        }
        self.peers.broadcast_except(
            sender,
            &ServerEvent::CursorMove {
                user_id: sender,
                position,
            },
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;
    use crate::domain::{Color, PeerTable};

    struct Room {
        registry: Arc<SessionRegistry>,
        peers: Arc<PeerTable>,
        router: EventRouter<PeerTable>,
    }

    fn room() -> Room {
        let registry = Arc::new(SessionRegistry::new());
        let peers = Arc::new(PeerTable::new());
        let router = EventRouter::new(Arc::clone(&registry), Arc::clone(&peers));
        Room {
            registry,
            peers,
            router,
        }
    }

    async fn add(room: &Room) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        room.registry.insert(id, Color::new("c")).await;
        room.peers.register(id, tx);
        (id, rx)
    }

    fn segment() -> DrawSegment {
        DrawSegment {
            prev_x: -5.0,
            prev_y: 1e9,
            x: 3.5,
            y: 4.5,
            color: Color::new("not-a-color"),
        }
    }

    #[tokio::test]
    async fn draw_reaches_others_verbatim_not_sender() {
        let room = room();
        let (a, mut rx_a) = add(&room).await;
        let (_b, mut rx_b) = add(&room).await;
        let (_c, mut rx_c) = add(&room).await;

        let relayed = room.router.dispatch(a, ClientEvent::Draw(segment())).await;
        assert_eq!(relayed, 2);

        assert!(rx_a.try_recv().is_err());
        for rx in [&mut rx_b, &mut rx_c] {
            let Ok(ServerEvent::Draw(got)) = rx.try_recv() else {
                panic!("expected draw");
            };
            assert_eq!(got, segment());
        }
    }

    #[tokio::test]
    async fn cursor_move_updates_registry_and_tags_sender() {
        let room = room();
        let (a, mut rx_a) = add(&room).await;
        let (_b, mut rx_b) = add(&room).await;

        let position = Position::new(10.0, 20.0);
        let relayed = room
            .router
            .dispatch(a, ClientEvent::CursorMove(position))
            .await;
        assert_eq!(relayed, 1);

        let stored = room.registry.get(a).await.and_then(|u| u.position);
        assert_eq!(stored, Some(position));
        assert!(rx_a.try_recv().is_err());
        assert_eq!(
            rx_b.try_recv().ok(),
            Some(ServerEvent::CursorMove {
                user_id: a,
                position
            })
        );
    }

    #[tokio::test]
    async fn cursor_move_from_unregistered_sender_is_dropped() {
        let room = room();
        let (_b, mut rx_b) = add(&room).await;
        let ghost = ConnectionId::new();

        let relayed = room
            .router
            .cursor_move(ghost, Position::new(1.0, 1.0))
            .await;
        assert_eq!(relayed, 0);
        assert!(!room.registry.contains(ghost).await);
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn cursor_move_only_touches_sender_entry() {
        let room = room();
        let (a, _rx_a) = add(&room).await;
        let (b, _rx_b) = add(&room).await;

        room.router.cursor_move(a, Position::new(7.0, 8.0)).await;

        assert!(room.registry.get(b).await.and_then(|u| u.position).is_none());
    }
}
