//! Reaction and read receipt entity <-> model mappers

use chat_core::entities::{ReadMark, Reaction};
use chat_core::value_objects::{MessageId, ReactionId, UserId};

use crate::models::{ReactionModel, ReadMarkModel};

/// Convert ReactionModel to Reaction entity
impl From<ReactionModel> for Reaction {
    fn from(model: ReactionModel) -> Self {
        Reaction {
            id: ReactionId::new(model.id),
            message_id: MessageId::new(model.message_id),
            user_id: UserId::new(model.user_id),
            reaction: model.reaction,
            created_at: model.created_at,
        }
    }
}

/// Convert ReadMarkModel to ReadMark entity
impl From<ReadMarkModel> for ReadMark {
    fn from(model: ReadMarkModel) -> Self {
        ReadMark {
            message_id: MessageId::new(model.message_id),
            user_id: UserId::new(model.user_id),
            read_at: model.read_at,
        }
    }
}
