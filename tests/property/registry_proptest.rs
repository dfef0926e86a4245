//! Property-based tests for the connection registry
//!
//! Random register/unregister interleavings are checked against a plain
//! model: a user is online exactly while they own at least one connection.

use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use chatrelay::backend::registry::{ConnectionHandle, ConnectionId, ConnectionRegistry};

#[derive(Debug, Clone)]
enum Op {
    Register { user: usize },
    Unregister { slot: usize },
    Reregister { slot: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..4usize).prop_map(|user| Op::Register { user }),
        2 => (0..16usize).prop_map(|slot| Op::Unregister { slot }),
        1 => (0..16usize).prop_map(|slot| Op::Reregister { slot }),
    ]
}

proptest! {
    #[test]
    fn test_online_set_matches_model(ops in prop::collection::vec(op(), 1..60)) {
        let users: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let registry = ConnectionRegistry::new();
        let mut issued: Vec<(ConnectionId, Uuid)> = Vec::new();
        let mut model: BTreeMap<ConnectionId, Uuid> = BTreeMap::new();
        let mut receivers = Vec::new();

        for op in ops {
            match op {
                Op::Register { user } => {
                    let (handle, rx) = ConnectionHandle::channel();
                    let id = ConnectionId::next();
                    prop_assert!(registry.register(users[user], id, handle));
                    issued.push((id, users[user]));
                    model.insert(id, users[user]);
                    receivers.push(rx);
                }
                Op::Unregister { slot } => {
                    let Some(&(id, _)) = issued.get(slot) else { continue };
                    let removed = registry.unregister(id);
                    prop_assert_eq!(removed.map(|c| c.user_id), model.remove(&id));
                }
                Op::Reregister { slot } => {
                    let Some(&(id, user)) = issued.get(slot) else { continue };
                    let (handle, _rx) = ConnectionHandle::channel();
                    let added = registry.register(user, id, handle);
                    prop_assert_eq!(added, !model.contains_key(&id));
                    model.insert(id, user);
                }
            }

            let expected: BTreeSet<Uuid> = model.values().copied().collect();
            prop_assert_eq!(registry.online_user_ids(), expected.clone());
            prop_assert_eq!(registry.connection_count(), model.len());
            for user in &users {
                let owned = model.values().filter(|u| *u == user).count();
                prop_assert_eq!(registry.connections_of(*user).len(), owned);
                prop_assert_eq!(registry.is_online(*user), owned > 0);
            }

            let snapshot = registry.snapshot();
            prop_assert_eq!(snapshot.online, expected);
            prop_assert_eq!(snapshot.connections.len(), model.len());
        }
    }
}
