//! Reaction service
//!
//! Handles message reactions. Adding is idempotent per (message, user, token);
//! both directions fan out to every participant, the reactor included.

use chat_core::{BroadcastEnvelope, BroadcastEvent, MessageId, Reaction, UserId};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::ReactionRequest;

use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::ServiceResult;
use super::message::MessageService;

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Add a reaction; only participants of the message's conversation may react
    #[instrument(skip(self, request), fields(reaction = %request.reaction))]
    pub async fn add_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        request: ReactionRequest,
    ) -> ServiceResult<Reaction> {
        request.validate()?;

        let messages = MessageService::new(self.ctx);
        let message = messages.require_message(message_id).await?;
        ConversationService::new(self.ctx)
            .require_participant(message.conversation_id, user_id)
            .await?;

        let reaction = self
            .ctx
            .bounded(
                "add_reaction",
                self.ctx
                    .reaction_repo()
                    .add(message_id, user_id, &request.reaction),
            )
            .await?;

        info!(
            message_id = %message_id,
            user_id = %user_id,
            reaction = %reaction.reaction,
            "Reaction added"
        );

        let recipients = messages.fan_out_recipients(message.conversation_id).await;
        self.ctx
            .broadcast(BroadcastEnvelope::new(
                BroadcastEvent::ReactionAdd {
                    payload: reaction.clone(),
                },
                recipients,
            ))
            .await;

        Ok(reaction)
    }

    /// Remove the caller's matching reaction.
    ///
    /// No participant check is made and the removal is announced even when
    /// nothing matched. Returns the number of rows removed.
    #[instrument(skip(self, request), fields(reaction = %request.reaction))]
    pub async fn remove_reaction(
        &self,
        message_id: MessageId,
        user_id: UserId,
        request: ReactionRequest,
    ) -> ServiceResult<u64> {
        request.validate()?;

        let messages = MessageService::new(self.ctx);
        let message = messages.require_message(message_id).await?;

        let removed = self
            .ctx
            .bounded(
                "remove_reaction",
                self.ctx
                    .reaction_repo()
                    .remove(message_id, user_id, &request.reaction),
            )
            .await?;

        info!(
            message_id = %message_id,
            user_id = %user_id,
            removed,
            "Reaction removed"
        );

        let recipients = messages.fan_out_recipients(message.conversation_id).await;
        self.ctx
            .broadcast(BroadcastEnvelope::new(
                BroadcastEvent::ReactionRemove {
                    payload: Reaction::removed(message_id, user_id, request.reaction),
                },
                recipients,
            ))
            .await;

        Ok(removed)
    }

    /// Reactions on a message the caller can see
    #[instrument(skip(self))]
    pub async fn list_reactions(
        &self,
        message_id: MessageId,
        user_id: UserId,
    ) -> ServiceResult<Vec<Reaction>> {
        let message = MessageService::new(self.ctx)
            .require_message(message_id)
            .await?;
        ConversationService::new(self.ctx)
            .require_participant(message.conversation_id, user_id)
            .await?;

        self.ctx
            .bounded(
                "find_reactions",
                self.ctx.reaction_repo().find_by_message(message_id),
            )
            .await
    }
}
