//! Conversation service
//!
//! Group creation, 1:1 conversation resolution, listings, and the participant
//! checks the other services share.

use chat_core::{Conversation, ConversationId, ConversationSummary, DomainError, UserId};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::dto::{CreateGroupRequest, Pagination, DEFAULT_CONVERSATION_LIMIT};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Conversation service
pub struct ConversationService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ConversationService<'a> {
    /// Create a new ConversationService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a group conversation.
    ///
    /// Every member, the creator included, must exist in the directory; one
    /// unknown id rejects the whole request. Groups produce no fan-out.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_group(
        &self,
        creator_id: UserId,
        request: CreateGroupRequest,
    ) -> ServiceResult<Conversation> {
        request.validate()?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Group name must not be blank"));
        }

        let mut members = Vec::with_capacity(request.member_ids.len() + 1);
        members.push(creator_id);
        for member in request.member_ids {
            if !members.contains(&member) {
                members.push(member);
            }
        }

        let all_exist = self
            .ctx
            .bounded("users_exist", self.ctx.user_directory().users_exist(&members))
            .await?;
        if !all_exist {
            return Err(DomainError::InvalidMembers.into());
        }

        let conversation = self
            .ctx
            .bounded("create_group", self.ctx.conversation_repo().create_group(name))
            .await?;

        for member in &members {
            self.ctx
                .bounded(
                    "add_participant",
                    self.ctx
                        .conversation_repo()
                        .add_participant(conversation.id, *member),
                )
                .await?;
        }

        info!(
            conversation_id = %conversation.id,
            creator_id = %creator_id,
            members = members.len(),
            "Group created"
        );

        Ok(conversation)
    }

    /// List the user's conversations with last message and unread count
    #[instrument(skip(self))]
    pub async fn list_conversations(
        &self,
        user_id: UserId,
        pagination: Pagination,
    ) -> ServiceResult<Vec<ConversationSummary>> {
        pagination.validate()?;
        let (limit, offset) = pagination.resolve(DEFAULT_CONVERSATION_LIMIT);

        self.ctx
            .bounded(
                "summaries_for_user",
                self.ctx
                    .conversation_repo()
                    .summaries_for_user(user_id, limit, offset),
            )
            .await
    }

    /// Participants of a conversation the caller belongs to
    #[instrument(skip(self))]
    pub async fn participants(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> ServiceResult<Vec<UserId>> {
        self.require_participant(conversation_id, user_id).await?;
        self.participant_ids(conversation_id).await
    }

    /// Find the 1:1 conversation between two users, creating it on first
    /// contact.
    ///
    /// The recipient is checked against the directory only when a new
    /// conversation has to be created.
    #[instrument(skip(self))]
    pub async fn resolve_direct(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
    ) -> ServiceResult<Conversation> {
        if sender_id == recipient_id {
            return Err(ServiceError::validation("Cannot message yourself"));
        }

        let existing = self
            .ctx
            .bounded(
                "find_direct",
                self.ctx.conversation_repo().find_direct(sender_id, recipient_id),
            )
            .await?;
        if let Some(conversation) = existing {
            return Ok(conversation);
        }

        if !self.ctx.user_exists(recipient_id).await {
            return Err(DomainError::UserNotFound(recipient_id).into());
        }

        let conversation = self
            .ctx
            .bounded(
                "create_direct",
                self.ctx
                    .conversation_repo()
                    .create_direct(sender_id, recipient_id),
            )
            .await?;

        info!(
            conversation_id = %conversation.id,
            sender_id = %sender_id,
            recipient_id = %recipient_id,
            "Direct conversation resolved"
        );

        Ok(conversation)
    }

    /// Load a conversation or fail with NotFound
    pub async fn require_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> ServiceResult<Conversation> {
        self.ctx
            .bounded(
                "find_conversation",
                self.ctx.conversation_repo().find_by_id(conversation_id),
            )
            .await?
            .ok_or_else(|| DomainError::ConversationNotFound(conversation_id).into())
    }

    /// Fail with an authorization error unless the user is a participant
    pub async fn require_participant(
        &self,
        conversation_id: ConversationId,
        user_id: UserId,
    ) -> ServiceResult<()> {
        let is_participant = self
            .ctx
            .bounded(
                "is_participant",
                self.ctx
                    .conversation_repo()
                    .is_participant(conversation_id, user_id),
            )
            .await?;

        if is_participant {
            Ok(())
        } else {
            debug!(
                conversation_id = %conversation_id,
                user_id = %user_id,
                "Rejected non-participant"
            );
            Err(DomainError::NotParticipant.into())
        }
    }

    pub async fn participant_ids(
        &self,
        conversation_id: ConversationId,
    ) -> ServiceResult<Vec<UserId>> {
        self.ctx
            .bounded(
                "participant_ids",
                self.ctx.conversation_repo().participant_ids(conversation_id),
            )
            .await
    }
}
