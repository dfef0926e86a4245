/**
 * Presence Broadcaster
 *
 * Pushes the full online set to every live connection whenever registry
 * membership changes. The payload is a snapshot, not a diff; a client that
 * misses one is corrected by the next.
 */

use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::backend::realtime::broadcast::push_to_connections;
use crate::backend::registry::ConnectionRegistry;
use crate::shared::event::ServerEvent;

#[derive(Debug, Clone)]
pub struct PresenceBroadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl PresenceBroadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Push the current online set to every live connection.
    ///
    /// Online set and recipient list come from one registry snapshot.
    /// Returns the number of connections the event was queued on.
    pub fn notify_membership_changed(&self) -> usize {
        let snapshot = self.registry.snapshot();
        let event = ServerEvent::OnlineUsers {
            user_ids: snapshot.online.iter().copied().collect(),
        };

        let delivered = push_to_connections(&snapshot.connections, &event);
        tracing::debug!(
            online = snapshot.online.len(),
            delivered,
            "[Presence] Online set broadcast"
        );
        delivered
    }

    /// Run the broadcaster on its own task.
    ///
    /// Changes that arrive while a broadcast is in progress coalesce into
    /// the next one.
    pub fn spawn(self) -> JoinHandle<()> {
        let changes = self.registry.changes();
        tokio::spawn(async move {
            loop {
                changes.notified().await;
                self.notify_membership_changed();
            }
        })
    }
}
