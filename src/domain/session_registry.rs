//! Process-wide map of connected users.
//!
//! [`SessionRegistry`] stores one [`User`] per open connection behind a
//! single [`tokio::sync::RwLock`]. Every operation takes the lock for the
//! duration of one map access; nothing awaits I/O while holding it.

use std::collections::HashMap;

use tokio::sync::{RwLock, RwLockWriteGuard};

use super::{Color, ConnectionId, Position, User};

/// Registry of the users behind all currently open connections.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    users: RwLock<HashMap<ConnectionId, User>>,
}

/// Write access to the registry held across a multi-step update.
pub type RegistryGuard<'a> = RwLockWriteGuard<'a, HashMap<ConnectionId, User>>;

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with the given color and no position.
    #[cfg(test)]
    pub(crate) async fn insert(&self, id: ConnectionId, color: Color) {
        self.users.write().await.insert(id, User::new(color));
    }

    /// Takes the registry write lock for a multi-step update such as
    /// a join followed by peer registration.
    ///
    /// Callers must not await I/O while holding the guard.
    pub async fn lock(&self) -> RegistryGuard<'_> {
        self.users.write().await
    }

    /// Overwrites the stored cursor position of `id`.
    ///
    /// Returns `false` without inserting anything when `id` is not
    /// registered: a user must have a color before it can have a position.
    pub async fn update_position(&self, id: ConnectionId, position: Position) -> bool {
        match self.users.write().await.get_mut(&id) {
            Some(user) => {
                user.position = Some(position);
                true
            }
            None => false,
        }
    }

    /// Returns a copy of the user registered under `id`.
    pub async fn get(&self, id: ConnectionId) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    #[cfg(test)]
    pub(crate) async fn contains(&self, id: ConnectionId) -> bool {
        self.users.read().await.contains_key(&id)
    }

    /// Returns a point-in-time copy of every registered user.
    pub async fn snapshot(&self) -> HashMap<ConnectionId, User> {
        self.users.read().await.clone()
    }

    /// Returns the number of registered users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }
}

/// Snapshots every user other than `id`, then registers `id`.
///
/// Runs on an already locked map so that no concurrent join can slip
/// between the snapshot and the insert.
pub(crate) fn join_locked(
    users: &mut HashMap<ConnectionId, User>,
    id: ConnectionId,
    color: Color,
) -> HashMap<ConnectionId, User> {
    let others: HashMap<ConnectionId, User> = users
        .iter()
        .filter(|(other, _)| **other != id)
        .map(|(other, user)| (*other, user.clone()))
        .collect();
    users.insert(id, User::new(color));
    others
}
