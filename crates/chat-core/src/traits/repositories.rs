//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the storage crate provides
//! the implementation.

use async_trait::async_trait;

use crate::entities::{
    Conversation, ConversationSummary, Message, NewMessage, ReadMark, Reaction,
};
use crate::error::DomainError;
use crate::value_objects::{ConversationId, MessageId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Conversation Repository
// ============================================================================

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Find conversation by ID
    async fn find_by_id(&self, id: ConversationId) -> RepoResult<Option<Conversation>>;

    /// Find the 1:1 conversation between two users
    async fn find_direct(&self, a: UserId, b: UserId) -> RepoResult<Option<Conversation>>;

    /// Create (or converge on) the 1:1 conversation between two users and
    /// make both of them participants
    async fn create_direct(&self, a: UserId, b: UserId) -> RepoResult<Conversation>;

    /// Create a group conversation
    async fn create_group(&self, name: &str) -> RepoResult<Conversation>;

    /// Add a participant (no-op if already present)
    async fn add_participant(&self, id: ConversationId, user_id: UserId) -> RepoResult<()>;

    /// IDs of all participants
    async fn participant_ids(&self, id: ConversationId) -> RepoResult<Vec<UserId>>;

    /// Check membership
    async fn is_participant(&self, id: ConversationId, user_id: UserId) -> RepoResult<bool>;

    /// Conversations the user belongs to, most recently active first
    async fn find_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Conversation>>;

    /// Conversation list with last message, unread count, and participants
    async fn summaries_for_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<ConversationSummary>>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID, including soft-deleted rows
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>>;

    /// Persist a new message
    async fn create(&self, message: &NewMessage) -> RepoResult<Message>;

    /// Replace content and set `edited_at`.
    ///
    /// Fails with `MessageDeleted` when the row is already soft-deleted.
    async fn update_content(&self, id: MessageId, content: &str) -> RepoResult<()>;

    /// Set `deleted_at`.
    ///
    /// Fails with `MessageAlreadyDeleted` when no live row was affected.
    async fn soft_delete(&self, id: MessageId) -> RepoResult<()>;

    /// Live messages of a conversation, newest first
    async fn find_by_conversation(
        &self,
        conversation_id: ConversationId,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Message>>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Add a reaction; a duplicate returns the existing row
    async fn add(&self, message_id: MessageId, user_id: UserId, reaction: &str)
        -> RepoResult<Reaction>;

    /// Remove matching reactions, returning the number of rows removed
    async fn remove(&self, message_id: MessageId, user_id: UserId, reaction: &str)
        -> RepoResult<u64>;

    /// All reactions on a message
    async fn find_by_message(&self, message_id: MessageId) -> RepoResult<Vec<Reaction>>;
}

// ============================================================================
// Read Receipt Repository
// ============================================================================

#[async_trait]
pub trait ReadReceiptRepository: Send + Sync {
    /// Record a read mark; a duplicate returns the existing mark
    async fn mark_read(&self, message_id: MessageId, user_id: UserId) -> RepoResult<ReadMark>;

    /// Everyone who has read a message
    async fn readers_of(&self, message_id: MessageId) -> RepoResult<Vec<ReadMark>>;
}
