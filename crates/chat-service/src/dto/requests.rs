//! Request DTOs
//!
//! Inputs arriving over HTTP or over the gateway socket. Field-level rules are
//! declared with `validator`; rules spanning several fields live in the
//! services that consume these types.

use chat_core::{Attachment, ConversationId, MessageKind, UserId};
use serde::Deserialize;
use validator::Validate;

/// Default page size for message history
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Default page size for conversation listings
pub const DEFAULT_CONVERSATION_LIMIT: i64 = 20;

/// Largest page any listing returns
pub const MAX_PAGE_LIMIT: i64 = 100;

// ============================================================================
// Conversation Requests
// ============================================================================

/// Create group conversation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100, message = "Group name must be 1-100 characters"))]
    pub name: String,

    /// Members besides the creator; the creator is always added
    #[serde(default)]
    pub member_ids: Vec<UserId>,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Send message request
///
/// Exactly one of `conversation_id` and `recipient_id` must be set. Without a
/// conversation the 1:1 conversation with the recipient is found or created.
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub conversation_id: Option<ConversationId>,

    pub recipient_id: Option<UserId>,

    #[serde(default)]
    pub content: String,

    #[serde(default, rename = "message_type")]
    pub kind: MessageKind,

    #[serde(default)]
    pub attachment: Option<Attachment>,
}

/// Edit message request
#[derive(Debug, Clone, Deserialize)]
pub struct EditMessageRequest {
    pub content: String,
}

// ============================================================================
// Reaction Requests
// ============================================================================

/// Add or remove reaction request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReactionRequest {
    #[validate(length(min = 1, max = 32, message = "Reaction must be 1-32 characters"))]
    pub reaction: String,
}

// ============================================================================
// Pagination
// ============================================================================

/// Offset pagination query (`?limit=&offset=`)
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct Pagination {
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must not be negative"))]
    pub offset: Option<i64>,
}

impl Pagination {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self { limit, offset }
    }

    /// Resolve to `(limit, offset)`
    ///
    /// A missing or non-positive limit falls back to `default_limit`; the
    /// result is capped at 100.
    pub fn resolve(&self, default_limit: i64) -> (i64, i64) {
        let limit = self
            .limit
            .filter(|limit| *limit > 0)
            .unwrap_or(default_limit)
            .clamp(1, MAX_PAGE_LIMIT);
        (limit, self.offset.unwrap_or(0).max(0))
    }
}

// ============================================================================
// Ephemeral (gateway) Requests
// ============================================================================

/// Typing indicator sent over the gateway socket
#[derive(Debug, Clone, Deserialize)]
pub struct TypingRequest {
    pub conversation_id: ConversationId,

    #[serde(default = "default_is_typing")]
    pub is_typing: bool,
}

fn default_is_typing() -> bool {
    true
}

/// Status change sent over the gateway socket
///
/// The status stays a string here so an unknown value is reported as a
/// validation failure instead of a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}
