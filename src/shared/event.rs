/**
 * Real-time Event System
 *
 * This module defines the events exchanged over a live connection. Both
 * directions are JSON objects tagged with a snake_case `type` field.
 *
 * # Client → server
 *
 * - `send` - Send a message to a conversation target
 * - `mark_seen` - Report that a message was viewed
 * - `fetch_history` - Catch up on a conversation from a sequence point
 * - `list_conversations` - Conversation list with unseen counts
 * - `peer_status` - Identity and online state of another user
 *
 * # Server → client
 *
 * Pushes (`online_users`, `new_message`, `message_seen`) arrive unprompted;
 * every client event gets exactly one reply on the same connection.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::{HistoryError, SeenError, SendError};
use crate::shared::messaging::{
    ConversationId, ConversationSummary, ConversationTarget, Message, MessageContent,
};
use crate::shared::user::UserIdentity;

/// Event emitted by a client on its connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    Send {
        target: ConversationTarget,
        content: MessageContent,
    },
    MarkSeen {
        message_id: Uuid,
    },
    FetchHistory {
        conversation_id: ConversationId,
        #[serde(default)]
        since_sequence: i64,
    },
    ListConversations,
    PeerStatus {
        user_id: Uuid,
    },
}

impl ClientEvent {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Send { .. } => "send",
            Self::MarkSeen { .. } => "mark_seen",
            Self::FetchHistory { .. } => "fetch_history",
            Self::ListConversations => "list_conversations",
            Self::PeerStatus { .. } => "peer_status",
        }
    }
}

/// Event pushed by the server to a connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Full current online set, sent on every membership change
    OnlineUsers { user_ids: Vec<Uuid> },
    /// A message arrived in one of the recipient's conversations
    NewMessage { message: Message },
    /// Another participant has seen a message
    MessageSeen {
        message_id: Uuid,
        conversation_id: ConversationId,
        user_id: Uuid,
    },
    /// Reply to `send`: the message is durable
    MessageSent { message: Message },
    /// Reply to `send`: nothing was stored
    SendFailed { error: SendError },
    /// Reply to `mark_seen`
    Seen { message: Message },
    /// Reply to `mark_seen`: nothing changed
    SeenFailed { error: SeenError },
    /// Reply to `fetch_history`
    History {
        conversation_id: ConversationId,
        messages: Vec<Message>,
    },
    /// Reply to `list_conversations`
    Conversations {
        conversations: Vec<ConversationSummary>,
    },
    /// Reply to `peer_status`
    Peer { user: UserIdentity, online: bool },
    /// Generic failure reply
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn history_failed(error: &HistoryError) -> Self {
        Self::error(error.kind(), error.to_string())
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::OnlineUsers { .. } => "online_users",
            Self::NewMessage { .. } => "new_message",
            Self::MessageSeen { .. } => "message_seen",
            Self::MessageSent { .. } => "message_sent",
            Self::SendFailed { .. } => "send_failed",
            Self::Seen { .. } => "seen",
            Self::SeenFailed { .. } => "seen_failed",
            Self::History { .. } => "history",
            Self::Conversations { .. } => "conversations",
            Self::Peer { .. } => "peer",
            Self::Error { .. } => "error",
        }
    }
}
