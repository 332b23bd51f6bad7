//! Reaction entity - a reaction token on a message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{MessageId, ReactionId, UserId};

/// Maximum reaction token length (in characters)
pub const MAX_REACTION_LENGTH: usize = 32;

/// Reaction entity, unique per (message, user, reaction)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: ReactionId,
    pub message_id: MessageId,
    pub user_id: UserId,
    pub reaction: String,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    /// Reaction payload describing a removal (no stored row remains)
    pub fn removed(message_id: MessageId, user_id: UserId, reaction: String) -> Self {
        Self {
            id: ReactionId::default(),
            message_id,
            user_id,
            reaction,
            created_at: Utc::now(),
        }
    }

    /// Check if reaction uses a specific token
    #[inline]
    pub fn is_token(&self, token: &str) -> bool {
        self.reaction == token
    }
}
