//! Conversation Data Structure
//!
//! Conversations are identified by their participant set and created lazily
//! on the first message between those participants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use super::message::Message;

/// Unique conversation ID
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    /// Allocate a fresh conversation ID
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for ConversationId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// Where an outgoing message should go
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ConversationTarget {
    /// One-to-one conversation with a peer (created on first message)
    Direct(Uuid),
    /// Conversation with a fixed set of peers (created on first message)
    Group(Vec<Uuid>),
    /// A conversation that already exists
    Existing(ConversationId),
}

impl ConversationTarget {
    /// Participant set implied by this target, including the sender.
    /// `None` for `Existing`, whose participants live in the store.
    pub fn participants_with(&self, sender_id: Uuid) -> Option<BTreeSet<Uuid>> {
        let mut participants = BTreeSet::new();
        participants.insert(sender_id);
        match self {
            Self::Direct(peer) => {
                participants.insert(*peer);
            }
            Self::Group(peers) => participants.extend(peers.iter().copied()),
            Self::Existing(_) => return None,
        }
        Some(participants)
    }
}

/// Conversation list entry for one viewer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSummary {
    pub conversation_id: ConversationId,
    pub participants: BTreeSet<Uuid>,
    /// Most recent message, if any
    pub last_message: Option<Message>,
    /// Messages from others the viewer has not seen yet
    pub unseen_count: u32,
}

impl ConversationSummary {
    /// Participants other than `viewer`
    pub fn others(&self, viewer: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.participants.iter().copied().filter(move |id| *id != viewer)
    }
}
