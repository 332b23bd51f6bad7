//! Conversation entity - a 1:1 or group chat and its participants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Message;
use crate::value_objects::{ConversationId, UserId};

/// Conversation entity
///
/// Non-group conversations have an empty name and exactly two participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub is_group: bool,
    #[serde(default)]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Display name for groups, `None` for 1:1 conversations
    pub fn display_name(&self) -> Option<&str> {
        if self.is_group && !self.name.is_empty() {
            Some(&self.name)
        } else {
            None
        }
    }

    /// Stable key for the unordered pair of a 1:1 conversation
    pub fn direct_key(a: UserId, b: UserId) -> String {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        format!("{low}:{high}")
    }
}

/// Membership of a user in a conversation (append-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub conversation_id: ConversationId,
    pub user_id: UserId,
    pub joined_at: DateTime<Utc>,
}

/// Conversation list entry as seen by one viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: Conversation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    pub unread_count: i64,
    pub participant_ids: Vec<UserId>,
}
