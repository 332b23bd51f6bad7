//! Conversation entity <-> model mapper

use chat_core::entities::{Conversation, ConversationSummary, Message};
use chat_core::value_objects::{ConversationId, MessageId, UserId};

use crate::models::{ConversationModel, ConversationSummaryModel};

use super::message::attachment_from_columns;

/// Convert ConversationModel to Conversation entity
impl From<ConversationModel> for Conversation {
    fn from(model: ConversationModel) -> Self {
        Conversation {
            id: ConversationId::new(model.id),
            is_group: model.is_group,
            name: model.name,
            created_at: model.created_at,
        }
    }
}

/// Convert ConversationSummaryModel to ConversationSummary
impl From<ConversationSummaryModel> for ConversationSummary {
    fn from(model: ConversationSummaryModel) -> Self {
        let conversation_id = ConversationId::new(model.id);

        let last_message = match (
            model.last_id,
            model.last_sender_id,
            model.last_created_at,
        ) {
            (Some(id), Some(sender_id), Some(created_at)) => Some(Message {
                id: MessageId::new(id),
                conversation_id,
                sender_id: UserId::new(sender_id),
                content: model.last_content.unwrap_or_default(),
                kind: model
                    .last_message_type
                    .as_deref()
                    .and_then(|t| t.parse().ok())
                    .unwrap_or_default(),
                attachment: attachment_from_columns(
                    model.last_file_url,
                    model.last_file_name,
                    model.last_file_size,
                    model.last_mime_type,
                ),
                created_at,
                edited_at: model.last_edited_at,
                deleted_at: None,
            }),
            _ => None,
        };

        ConversationSummary {
            conversation: Conversation {
                id: conversation_id,
                is_group: model.is_group,
                name: model.name,
                created_at: model.created_at,
            },
            last_message,
            unread_count: model.unread_count,
            participant_ids: model.participant_ids.into_iter().map(UserId::new).collect(),
        }
    }
}
