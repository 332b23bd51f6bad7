//! Message entity <-> model mapper

use chat_core::entities::{Attachment, Message, NewMessage};
use chat_core::value_objects::{ConversationId, MessageId, UserId};

use crate::models::MessageModel;

/// Rebuild an attachment from its nullable columns; `file_url` decides presence
pub(crate) fn attachment_from_columns(
    url: Option<String>,
    name: Option<String>,
    size: Option<i64>,
    mime_type: Option<String>,
) -> Option<Attachment> {
    url.map(|url| Attachment {
        url,
        name: name.unwrap_or_default(),
        size: size.unwrap_or_default(),
        mime_type: mime_type.unwrap_or_default(),
    })
}

/// Convert MessageModel to Message entity
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: MessageId::new(model.id),
            conversation_id: ConversationId::new(model.conversation_id),
            sender_id: UserId::new(model.sender_id),
            content: model.content,
            // The column is constrained to known kinds
            kind: model.message_type.parse().unwrap_or_default(),
            attachment: attachment_from_columns(
                model.file_url,
                model.file_name,
                model.file_size,
                model.mime_type,
            ),
            created_at: model.created_at,
            edited_at: model.edited_at,
            deleted_at: model.deleted_at,
        }
    }
}

/// Column values for inserting a new message
pub struct MessageInsert<'a> {
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: &'a str,
    pub message_type: &'static str,
    pub file_url: Option<&'a str>,
    pub file_name: Option<&'a str>,
    pub file_size: Option<i64>,
    pub mime_type: Option<&'a str>,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a NewMessage) -> Self {
        let attachment = message.attachment.as_ref();
        Self {
            conversation_id: message.conversation_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            content: &message.content,
            message_type: message.kind.as_str(),
            file_url: attachment.map(|a| a.url.as_str()),
            file_name: attachment.map(|a| a.name.as_str()),
            file_size: attachment.map(|a| a.size),
            mime_type: attachment.map(|a| a.mime_type.as_str()),
        }
    }
}
