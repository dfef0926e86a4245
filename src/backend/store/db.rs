//! Database operations for messaging
//!
//! SQLite-backed `MessageStore` and `UserDirectory`. Every write runs in its
//! own transaction; `messages.sequence` (an AUTOINCREMENT rowid) provides
//! the per-conversation ordering.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

use super::{participant_key, MessageStore, StoreError};
use crate::backend::auth::users::UserDirectory;
use crate::shared::messaging::{ConversationId, ConversationSummary, Message};
use crate::shared::user::UserIdentity;

const MESSAGE_COLUMNS: &str =
    "sequence, id, conversation_id, sender_id, text, attachment_ref, created_at";

/// sqlx-backed store
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `url` (e.g. `sqlite://chat.db` or `sqlite::memory:`) and
    /// run migrations
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives exactly as long as its one connection
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and run migrations
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations completed successfully");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert or refresh a user mirrored from the account service
    pub async fn upsert_user(&self, user: &UserIdentity) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, display_name, avatar_ref)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                display_name = excluded.display_name,
                avatar_ref = excluded.avatar_ref
            "#,
        )
        .bind(user.id)
        .bind(&user.display_name)
        .bind(&user.avatar_ref)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn seen_by(&self, message_id: Uuid) -> Result<BTreeSet<Uuid>, StoreError> {
        let rows = sqlx::query("SELECT user_id FROM message_seen WHERE message_id = ?1")
            .bind(message_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|row| row.try_get::<Uuid, _>("user_id").map_err(StoreError::from))
            .collect()
    }

    async fn message_with_seen(&self, row: &SqliteRow) -> Result<Message, StoreError> {
        let mut message = message_from_row(row)?;
        message.seen_by = self.seen_by(message.id).await?;
        Ok(message)
    }
}

fn message_from_row(row: &SqliteRow) -> Result<Message, StoreError> {
    Ok(Message {
        id: row.try_get("id")?,
        conversation_id: ConversationId(row.try_get("conversation_id")?),
        sender_id: row.try_get("sender_id")?,
        text: row.try_get("text")?,
        attachment_ref: row.try_get("attachment_ref")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        sequence: row.try_get("sequence")?,
        seen_by: BTreeSet::new(),
    })
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn find_or_create_conversation(
        &self,
        participants: &BTreeSet<Uuid>,
    ) -> Result<ConversationId, StoreError> {
        let key = participant_key(participants);
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query(
            r#"
            INSERT INTO conversations (id, participant_key, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?3)
            ON CONFLICT(participant_key) DO NOTHING
            "#,
        )
        .bind(ConversationId::new().0)
        .bind(&key)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let id: Uuid = sqlx::query("SELECT id FROM conversations WHERE participant_key = ?1")
            .bind(&key)
            .fetch_one(&mut *tx)
            .await?
            .try_get("id")?;

        if created.rows_affected() == 1 {
            for user_id in participants {
                sqlx::query(
                    "INSERT INTO conversation_participants (conversation_id, user_id) VALUES (?1, ?2)",
                )
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
            }
            tracing::debug!(conversation_id = %id, participants = participants.len(), "Conversation created");
        }

        tx.commit().await?;
        Ok(ConversationId(id))
    }

    async fn insert_message(&self, message: &Message) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO messages (id, conversation_id, sender_id, text, attachment_ref, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(message.id)
        .bind(message.conversation_id.0)
        .bind(message.sender_id)
        .bind(&message.text)
        .bind(&message.attachment_ref)
        .bind(message.created_at)
        .execute(&mut *tx)
        .await?;
        let sequence = result.last_insert_rowid();

        for user_id in &message.seen_by {
            sqlx::query(
                "INSERT OR IGNORE INTO message_seen (message_id, user_id, seen_at) VALUES (?1, ?2, ?3)",
            )
            .bind(message.id)
            .bind(user_id)
            .bind(message.created_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE conversations SET updated_at = ?1 WHERE id = ?2")
            .bind(message.created_at)
            .bind(message.conversation_id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(sequence)
    }

    async fn list_participants(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<BTreeSet<Uuid>>, StoreError> {
        let rows = sqlx::query(
            "SELECT user_id FROM conversation_participants WHERE conversation_id = ?1",
        )
        .bind(conversation_id.0)
        .fetch_all(&self.pool)
        .await?;

        // Every conversation is created with at least one participant
        if rows.is_empty() {
            return Ok(None);
        }
        let participants = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("user_id"))
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Some(participants))
    }

    async fn fetch_history(
        &self,
        conversation_id: ConversationId,
        since_sequence: i64,
    ) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE conversation_id = ?1 AND sequence > ?2 ORDER BY sequence ASC"
        ))
        .bind(conversation_id.0)
        .bind(since_sequence)
        .fetch_all(&self.pool)
        .await?;

        let seen_rows = sqlx::query(
            r#"
            SELECT s.message_id, s.user_id
            FROM message_seen s
            INNER JOIN messages m ON m.id = s.message_id
            WHERE m.conversation_id = ?1 AND m.sequence > ?2
            "#,
        )
        .bind(conversation_id.0)
        .bind(since_sequence)
        .fetch_all(&self.pool)
        .await?;

        let mut seen: HashMap<Uuid, BTreeSet<Uuid>> = HashMap::new();
        for row in &seen_rows {
            let message_id: Uuid = row.try_get("message_id")?;
            let user_id: Uuid = row.try_get("user_id")?;
            seen.entry(message_id).or_default().insert(user_id);
        }

        rows.iter()
            .map(|row| {
                let mut message = message_from_row(row)?;
                message.seen_by = seen.remove(&message.id).unwrap_or_default();
                Ok(message)
            })
            .collect()
    }

    async fn find_message(&self, message_id: Uuid) -> Result<Option<Message>, StoreError> {
        let row = sqlx::query(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"))
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.message_with_seen(&row).await?)),
            None => Ok(None),
        }
    }

    async fn add_seen(&self, message_id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO message_seen (message_id, user_id, seen_at) VALUES (?1, ?2, ?3)",
        )
        .bind(message_id)
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<ConversationSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT c.id
            FROM conversations c
            INNER JOIN conversation_participants cp ON c.id = cp.conversation_id
            WHERE cp.user_id = ?1
            ORDER BY COALESCE((SELECT MAX(m.sequence) FROM messages m WHERE m.conversation_id = c.id), 0) DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in rows {
            let conversation_id = ConversationId(row.try_get("id")?);

            let participants = self
                .list_participants(conversation_id)
                .await?
                .unwrap_or_default();

            let last_row = sqlx::query(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages \
                 WHERE conversation_id = ?1 ORDER BY sequence DESC LIMIT 1"
            ))
            .bind(conversation_id.0)
            .fetch_optional(&self.pool)
            .await?;
            let last_message = match last_row {
                Some(row) => Some(self.message_with_seen(&row).await?),
                None => None,
            };

            let unseen: i64 = sqlx::query(
                r#"
                SELECT COUNT(*) AS count
                FROM messages m
                WHERE m.conversation_id = ?1
                  AND m.sender_id != ?2
                  AND NOT EXISTS (
                      SELECT 1 FROM message_seen s WHERE s.message_id = m.id AND s.user_id = ?2
                  )
                "#,
            )
            .bind(conversation_id.0)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?
            .try_get("count")?;

            summaries.push(ConversationSummary {
                conversation_id,
                participants,
                last_message,
                unseen_count: u32::try_from(unseen).unwrap_or(u32::MAX),
            });
        }

        Ok(summaries)
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<UserIdentity>, StoreError> {
        let row = sqlx::query("SELECT id, display_name, avatar_ref FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(UserIdentity {
                id: row.try_get("id")?,
                display_name: row.try_get("display_name")?,
                avatar_ref: row.try_get("avatar_ref")?,
            })
        })
        .transpose()
    }
}
