/**
 * Real-time Event Fan-out
 *
 * Helpers that push a `ServerEvent` to a set of live connections. A push
 * that fails because the connection is closing is logged and skipped; it is
 * never an error for the caller.
 */

use uuid::Uuid;

use crate::backend::registry::{Connection, ConnectionRegistry};
use crate::shared::event::ServerEvent;

/// Push `event` to each connection in `connections`
///
/// # Returns
///
/// Number of connections the event was queued on
pub fn push_to_connections<'a>(
    connections: impl IntoIterator<Item = &'a Connection>,
    event: &ServerEvent,
) -> usize {
    let mut delivered = 0;
    for connection in connections {
        match connection.handle.push(event.clone()) {
            Ok(()) => delivered += 1,
            Err(e) => {
                tracing::debug!(
                    connection_id = %connection.connection_id,
                    user_id = %connection.user_id,
                    event = event.name(),
                    "[Realtime] Push skipped: {}",
                    e
                );
            }
        }
    }
    delivered
}

/// Push `event` to every live connection of `user_id`
pub fn send_to_user(registry: &ConnectionRegistry, user_id: Uuid, event: &ServerEvent) -> usize {
    push_to_connections(&registry.connections_of(user_id), event)
}

/// Push `event` to every live connection of each user in `user_ids`
pub fn send_to_users(
    registry: &ConnectionRegistry,
    user_ids: impl IntoIterator<Item = Uuid>,
    event: &ServerEvent,
) -> usize {
    user_ids
        .into_iter()
        .map(|user_id| send_to_user(registry, user_id, event))
        .sum()
}
