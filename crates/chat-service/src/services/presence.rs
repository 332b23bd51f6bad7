//! Presence service
//!
//! Ephemeral events from live sessions: typing indicators and status changes.
//! Nothing here is persisted; the envelope goes straight to the event bus.

use chat_core::{
    BroadcastEnvelope, BroadcastEvent, PresenceStatus, StatusChange, TypingIndicator, UserId,
};
use tracing::{debug, instrument};

use crate::dto::{StatusRequest, TypingRequest, MAX_PAGE_LIMIT};

use super::context::ServiceContext;
use super::conversation::ConversationService;
use super::error::ServiceResult;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Announce that the user started or stopped typing.
    ///
    /// Goes to every participant, the typer included. The user id on the
    /// indicator is always the authenticated one.
    #[instrument(skip(self, request), fields(conversation_id = %request.conversation_id))]
    pub async fn typing(
        &self,
        user_id: UserId,
        username: &str,
        request: TypingRequest,
    ) -> ServiceResult<usize> {
        let conversations = ConversationService::new(self.ctx);
        conversations
            .require_conversation(request.conversation_id)
            .await?;
        conversations
            .require_participant(request.conversation_id, user_id)
            .await?;

        let recipients = conversations
            .participant_ids(request.conversation_id)
            .await?;
        let count = recipients.len();

        self.ctx
            .broadcast(BroadcastEnvelope::new(
                BroadcastEvent::Typing {
                    payload: TypingIndicator {
                        conversation_id: request.conversation_id,
                        user_id,
                        username: username.to_string(),
                        is_typing: request.is_typing,
                    },
                },
                recipients,
            ))
            .await;

        Ok(count)
    }

    /// Announce a status change to everyone the user shares a conversation
    /// with.
    ///
    /// Looks at up to 100 of the user's conversations. A contact met in
    /// several conversations appears once per conversation.
    #[instrument(skip(self, request), fields(status = %request.status))]
    pub async fn update_status(
        &self,
        user_id: UserId,
        username: &str,
        request: StatusRequest,
    ) -> ServiceResult<usize> {
        let status: PresenceStatus = request.status.parse()?;

        let joined = self
            .ctx
            .bounded(
                "find_user_conversations",
                self.ctx
                    .conversation_repo()
                    .find_by_user(user_id, MAX_PAGE_LIMIT, 0),
            )
            .await?;

        let conversations = ConversationService::new(self.ctx);
        let mut recipients = Vec::new();
        for conversation in &joined {
            let participants = conversations.participant_ids(conversation.id).await?;
            recipients.extend(participants.into_iter().filter(|id| *id != user_id));
        }
        let count = recipients.len();

        debug!(
            user_id = %user_id,
            conversations = joined.len(),
            recipients = count,
            "Status change fan-out"
        );

        self.ctx
            .broadcast(BroadcastEnvelope::new(
                BroadcastEvent::Status {
                    payload: StatusChange {
                        user_id,
                        username: username.to_string(),
                        status,
                    },
                },
                recipients,
            ))
            .await;

        Ok(count)
    }
}
