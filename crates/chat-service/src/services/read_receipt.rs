//! Read receipt service
//!
//! A read receipt is a private signal for the message's sender: it is never
//! shown to the rest of the conversation.

use chat_core::{BroadcastEnvelope, BroadcastEvent, MessageId, ReadMark, UserId};
use tracing::{debug, info, instrument};

use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::ServiceResult;
use super::message::MessageService;

/// Read receipt service
pub struct ReadReceiptService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReadReceiptService<'a> {
    /// Create a new ReadReceiptService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mark a message as read by the caller.
    ///
    /// Returns `None` when the caller sent the message: reading your own
    /// message stores nothing and notifies nobody.
    #[instrument(skip(self))]
    pub async fn mark_as_read(
        &self,
        message_id: MessageId,
        user_id: UserId,
    ) -> ServiceResult<Option<ReadMark>> {
        let message = MessageService::new(self.ctx)
            .require_message(message_id)
            .await?;

        if message.is_sent_by(user_id) {
            debug!(message_id = %message_id, "Sender read own message, ignoring");
            return Ok(None);
        }

        ConversationService::new(self.ctx)
            .require_participant(message.conversation_id, user_id)
            .await?;

        let mark = self
            .ctx
            .bounded(
                "mark_read",
                self.ctx.read_receipt_repo().mark_read(message_id, user_id),
            )
            .await?;

        info!(message_id = %message_id, reader_id = %user_id, "Message read");

        self.ctx
            .broadcast(BroadcastEnvelope::new(
                BroadcastEvent::ReadReceipt {
                    payload: mark.clone(),
                },
                vec![message.sender_id],
            ))
            .await;

        Ok(Some(mark))
    }

    /// Who has read a message; visible to participants only
    #[instrument(skip(self))]
    pub async fn readers(
        &self,
        message_id: MessageId,
        user_id: UserId,
    ) -> ServiceResult<Vec<ReadMark>> {
        let message = MessageService::new(self.ctx)
            .require_message(message_id)
            .await?;
        ConversationService::new(self.ctx)
            .require_participant(message.conversation_id, user_id)
            .await?;

        self.ctx
            .bounded(
                "readers_of",
                self.ctx.read_receipt_repo().readers_of(message_id),
            )
            .await
    }
}
