//! Connection Registry
//!
//! In-process map of which users are online and through which connections.
//! A user may hold several connections at once (multi-device); the user is
//! online while at least one remains.
//!
//! # Consistency
//!
//! Both indexes (`user → connections` and `connection → entry`) sit behind
//! one `RwLock`, so every operation is linearizable and a reader never sees
//! a connection in one index but not the other. The online set is derived
//! from the user index on read and is never stored.
//!
//! Each membership change signals a `Notify`; the presence broadcaster
//! waits on it. Mutations never wait for a broadcast to finish.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Notify;
use uuid::Uuid;

/// Connection ids, handles and entries
pub mod connection;

pub use connection::{Connection, ConnectionClosed, ConnectionHandle, ConnectionId};

#[derive(Debug, Default)]
struct Indexes {
    by_user: HashMap<Uuid, HashSet<ConnectionId>>,
    connections: HashMap<ConnectionId, Connection>,
}

/// Online set and live connections taken under a single lock
#[derive(Debug, Clone, Default)]
pub struct PresenceSnapshot {
    pub online: BTreeSet<Uuid>,
    pub connections: Vec<Connection>,
}

/// Registry of live connections
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<Indexes>,
    changed: Arc<Notify>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Indexes> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Indexes> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Signal fired after every membership change
    pub fn changes(&self) -> Arc<Notify> {
        Arc::clone(&self.changed)
    }

    /// Add a connection for `user_id`.
    ///
    /// Re-registering a known `connection_id` changes nothing and returns
    /// `false`.
    pub fn register(&self, user_id: Uuid, connection_id: ConnectionId, handle: ConnectionHandle) -> bool {
        {
            let mut inner = self.write();
            if inner.connections.contains_key(&connection_id) {
                return false;
            }
            inner
                .connections
                .insert(connection_id, Connection::new(connection_id, user_id, handle));
            inner.by_user.entry(user_id).or_default().insert(connection_id);
        }

        tracing::debug!(user_id = %user_id, connection_id = %connection_id, "Connection registered");
        self.changed.notify_one();
        true
    }

    /// Remove a connection. Unknown ids are a no-op.
    pub fn unregister(&self, connection_id: ConnectionId) -> Option<Connection> {
        let removed = {
            let mut inner = self.write();
            let removed = inner.connections.remove(&connection_id)?;
            if let Some(ids) = inner.by_user.get_mut(&removed.user_id) {
                ids.remove(&connection_id);
                if ids.is_empty() {
                    inner.by_user.remove(&removed.user_id);
                }
            }
            removed
        };

        tracing::debug!(
            user_id = %removed.user_id,
            connection_id = %connection_id,
            "Connection unregistered"
        );
        self.changed.notify_one();
        Some(removed)
    }

    /// Live connections of a user
    pub fn connections_of(&self, user_id: Uuid) -> Vec<Connection> {
        let inner = self.read();
        inner
            .by_user
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.connections.get(id).cloned())
            .collect()
    }

    /// Users with at least one live connection
    pub fn online_user_ids(&self) -> BTreeSet<Uuid> {
        self.read().by_user.keys().copied().collect()
    }

    pub fn snapshot(&self) -> PresenceSnapshot {
        let inner = self.read();
        PresenceSnapshot {
            online: inner.by_user.keys().copied().collect(),
            connections: inner.connections.values().cloned().collect(),
        }
    }

    pub fn connection(&self, connection_id: ConnectionId) -> Option<Connection> {
        self.read().connections.get(&connection_id).cloned()
    }

    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.read().by_user.contains_key(&user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.read().connections.len()
    }
}
