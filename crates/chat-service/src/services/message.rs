//! Message service
//!
//! Handles the message lifecycle: send, edit, soft delete, and history.
//! A message moves `created -> edited* -> deleted` and never leaves `deleted`.

use chat_core::{
    BroadcastEnvelope, BroadcastEvent, ConversationId, DomainError, Message, MessageDeleted,
    MessageId, NewMessage, UserId, MAX_CONTENT_LENGTH,
};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::{EditMessageRequest, Pagination, SendMessageRequest, DEFAULT_HISTORY_LIMIT};

use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::{ServiceError, ServiceResult};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a message to a conversation or, by recipient id, to the 1:1
    /// conversation with that user.
    ///
    /// Recipients are every participant except the sender.
    #[instrument(skip(self, request))]
    pub async fn send_message(
        &self,
        sender_id: UserId,
        request: SendMessageRequest,
    ) -> ServiceResult<Message> {
        check_content(&request.content, request.attachment.is_some())?;
        if let Some(attachment) = &request.attachment {
            if attachment.url.trim().is_empty() {
                return Err(ServiceError::validation("Attachment url is required"));
            }
        }

        let conversations = ConversationService::new(self.ctx);
        let conversation_id = match (request.conversation_id, request.recipient_id) {
            (Some(conversation_id), None) => {
                conversations.require_conversation(conversation_id).await?;
                conversations
                    .require_participant(conversation_id, sender_id)
                    .await?;
                conversation_id
            }
            (None, Some(recipient_id)) => {
                conversations
                    .resolve_direct(sender_id, recipient_id)
                    .await?
                    .id
            }
            _ => {
                return Err(ServiceError::validation(
                    "Exactly one of conversation_id or recipient_id is required",
                ))
            }
        };

        let new_message = NewMessage {
            conversation_id,
            sender_id,
            content: request.content,
            kind: request.kind,
            attachment: request.attachment,
        };

        let message = self
            .ctx
            .bounded("create_message", self.ctx.message_repo().create(&new_message))
            .await?;

        info!(
            message_id = %message.id,
            conversation_id = %conversation_id,
            sender_id = %sender_id,
            kind = %message.kind,
            "Message sent"
        );

        let recipients: Vec<UserId> = self
            .fan_out_recipients(conversation_id)
            .await
            .into_iter()
            .filter(|id| *id != sender_id)
            .collect();

        self.ctx
            .broadcast(BroadcastEnvelope::new(
                BroadcastEvent::Message {
                    message: message.clone(),
                },
                recipients,
            ))
            .await;

        Ok(message)
    }

    /// Edit the content of a message the caller sent.
    ///
    /// The stored row is re-read after the update and the full record goes
    /// to every participant.
    #[instrument(skip(self, request))]
    pub async fn edit_message(
        &self,
        message_id: MessageId,
        user_id: UserId,
        request: EditMessageRequest,
    ) -> ServiceResult<Message> {
        check_content(&request.content, false)?;

        let message = self.require_message(message_id).await?;
        if !message.is_sent_by(user_id) {
            return Err(DomainError::NotMessageSender.into());
        }
        if message.is_deleted() {
            return Err(DomainError::MessageDeleted.into());
        }

        self.ctx
            .bounded(
                "update_message",
                self.ctx
                    .message_repo()
                    .update_content(message_id, &request.content),
            )
            .await?;

        let updated = self.require_message(message_id).await?;

        info!(message_id = %message_id, user_id = %user_id, "Message edited");

        let recipients = self.fan_out_recipients(updated.conversation_id).await;
        self.ctx
            .broadcast(BroadcastEnvelope::new(
                BroadcastEvent::MessageEdit {
                    message: updated.clone(),
                },
                recipients,
            ))
            .await;

        Ok(updated)
    }

    /// Soft delete a message the caller sent.
    ///
    /// A second delete of the same message is a conflict. The tombstone
    /// carries only the message id.
    #[instrument(skip(self))]
    pub async fn delete_message(&self, message_id: MessageId, user_id: UserId) -> ServiceResult<()> {
        let message = self.require_message(message_id).await?;
        if !message.is_sent_by(user_id) {
            return Err(DomainError::NotMessageSender.into());
        }

        self.ctx
            .bounded("delete_message", self.ctx.message_repo().soft_delete(message_id))
            .await?;

        info!(message_id = %message_id, user_id = %user_id, "Message deleted");

        let recipients = self.fan_out_recipients(message.conversation_id).await;
        self.ctx
            .broadcast(BroadcastEnvelope::new(
                BroadcastEvent::MessageDelete {
                    payload: MessageDeleted { message_id },
                },
                recipients,
            ))
            .await;

        Ok(())
    }

    /// Page through a conversation's messages, newest first, deleted excluded
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
        pagination: Pagination,
    ) -> ServiceResult<Vec<Message>> {
        pagination.validate()?;
        let (limit, offset) = pagination.resolve(DEFAULT_HISTORY_LIMIT);

        let conversations = ConversationService::new(self.ctx);
        conversations.require_conversation(conversation_id).await?;
        conversations
            .require_participant(conversation_id, user_id)
            .await?;

        self.ctx
            .bounded(
                "find_messages",
                self.ctx
                    .message_repo()
                    .find_by_conversation(conversation_id, limit, offset),
            )
            .await
    }

    // === Helpers ===

    /// Load a message, deleted or not, or fail with NotFound
    pub(crate) async fn require_message(&self, message_id: MessageId) -> ServiceResult<Message> {
        self.ctx
            .bounded("find_message", self.ctx.message_repo().find_by_id(message_id))
            .await?
            .ok_or_else(|| DomainError::MessageNotFound(message_id).into())
    }

    /// Participants to notify after a mutation has been persisted.
    ///
    /// A lookup failure here cannot undo the mutation, so it is logged and
    /// the fan-out is skipped.
    pub(crate) async fn fan_out_recipients(&self, conversation_id: ConversationId) -> Vec<UserId> {
        match ConversationService::new(self.ctx)
            .participant_ids(conversation_id)
            .await
        {
            Ok(ids) => ids,
            Err(e) => {
                warn!(
                    conversation_id = %conversation_id,
                    error = %e,
                    "Failed to load participants for fan-out"
                );
                Vec::new()
            }
        }
    }
}

/// Content must be non-blank unless an attachment carries the message, and
/// at most 4000 characters.
fn check_content(content: &str, has_attachment: bool) -> ServiceResult<()> {
    if content.trim().is_empty() && !has_attachment {
        return Err(ServiceError::validation("Message content is required"));
    }
    if content.chars().count() > MAX_CONTENT_LENGTH {
        return Err(DomainError::ContentTooLong {
            max: MAX_CONTENT_LENGTH,
        }
        .into());
    }
    Ok(())
}
