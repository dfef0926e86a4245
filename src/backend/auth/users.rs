/**
 * User Directory
 *
 * Lookup of user identities owned by the account service. The realtime
 * core only reads from it.
 */

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::backend::store::StoreError;
use crate::shared::user::UserIdentity;

/// Read access to user identities
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Get user by ID, `None` if the account does not exist
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserIdentity>, StoreError>;
}

/// Directory held in process memory
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<Uuid, UserIdentity>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a user
    pub fn insert(&self, user: UserIdentity) {
        self.users
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(user.id, user);
    }

    pub fn remove(&self, user_id: Uuid) -> Option<UserIdentity> {
        self.users
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&user_id)
    }
}

impl FromIterator<UserIdentity> for InMemoryUserDirectory {
    fn from_iter<I: IntoIterator<Item = UserIdentity>>(iter: I) -> Self {
        let users = iter.into_iter().map(|user| (user.id, user)).collect();
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserIdentity>, StoreError> {
        Ok(self
            .users
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&user_id)
            .cloned())
    }
}
