/**
 * Store Configuration
 *
 * Selects and prepares the message store and user directory from the
 * server configuration.
 *
 * # Error Handling
 *
 * Store setup never prevents startup. Without `DATABASE_URL`, or when the
 * database cannot be opened, the server logs the problem and continues on
 * the in-memory store; messages then last only as long as the process.
 */

use std::sync::Arc;

use crate::backend::auth::{InMemoryUserDirectory, UserDirectory};
use crate::backend::store::{InMemoryStore, MessageStore, SqliteStore};
use crate::shared::config::ServerConfig;

/// Message store and user directory chosen at startup
#[derive(Clone)]
pub struct Stores {
    pub messages: Arc<dyn MessageStore>,
    pub users: Arc<dyn UserDirectory>,
}

impl Stores {
    /// In-memory store and directory, seeded with `config.users`
    pub fn in_memory(config: &ServerConfig) -> Self {
        let users: InMemoryUserDirectory = config.users.iter().cloned().collect();
        Self {
            messages: Arc::new(InMemoryStore::new()),
            users: Arc::new(users),
        }
    }
}

/// Open the configured database, falling back to the in-memory store.
///
/// Seed users from the configuration are upserted into the database.
pub async fn load_stores(config: &ServerConfig) -> Stores {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set. Messages will not survive a restart.");
        return Stores::in_memory(config);
    };

    tracing::info!("Connecting to database...");
    let store = match SqliteStore::connect(database_url).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("Failed to open database: {}", e);
            tracing::warn!("Falling back to the in-memory store.");
            return Stores::in_memory(config);
        }
    };
    tracing::info!("Database connection pool created successfully");

    for user in &config.users {
        if let Err(e) = store.upsert_user(user).await {
            tracing::warn!(user_id = %user.id, "Failed to seed user: {}", e);
        }
    }

    let store = Arc::new(store);
    Stores {
        messages: store.clone(),
        users: store,
    }
}
