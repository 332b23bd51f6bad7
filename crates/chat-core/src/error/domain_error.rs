//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{ConversationId, MessageId, UserId};

/// Error taxonomy shared by every layer above the domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Authorization,
    NotFound,
    Conflict,
    Unavailable,
    Internal,
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(ConversationId),

    #[error("Message not found: {0}")]
    MessageNotFound(MessageId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("One or more members do not exist")]
    InvalidMembers,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not a participant of this conversation")]
    NotParticipant,

    #[error("Not message sender")]
    NotMessageSender,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Message has been deleted")]
    MessageDeleted,

    #[error("Message already deleted")]
    MessageAlreadyDeleted,

    // =========================================================================
    // External Collaborators Unavailable
    // =========================================================================
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("User directory unavailable: {0}")]
    DirectoryUnavailable(String),

    #[error("Event bus error: {0}")]
    EventBusError(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Classify into the shared taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UserNotFound(_) | Self::ConversationNotFound(_) | Self::MessageNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::ValidationError(_) | Self::ContentTooLong { .. } | Self::InvalidMembers => {
                ErrorKind::Validation
            }
            Self::NotParticipant | Self::NotMessageSender => ErrorKind::Authorization,
            Self::MessageDeleted | Self::MessageAlreadyDeleted => ErrorKind::Conflict,
            Self::StorageUnavailable(_)
            | Self::DirectoryUnavailable(_)
            | Self::EventBusError(_)
            | Self::Timeout(_) => ErrorKind::Unavailable,
            Self::DatabaseError(_) | Self::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::ConversationNotFound(_) => "UNKNOWN_CONVERSATION",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::InvalidMembers => "INVALID_MEMBERS",

            // Authorization
            Self::NotParticipant => "NOT_PARTICIPANT",
            Self::NotMessageSender => "NOT_MESSAGE_SENDER",

            // Conflict
            Self::MessageDeleted => "MESSAGE_DELETED",
            Self::MessageAlreadyDeleted => "MESSAGE_ALREADY_DELETED",

            // Unavailable
            Self::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            Self::DirectoryUnavailable(_) => "DIRECTORY_UNAVAILABLE",
            Self::EventBusError(_) => "EVENT_BUS_ERROR",
            Self::Timeout(_) => "TIMEOUT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        self.kind() == ErrorKind::Authorization
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        self.kind() == ErrorKind::Conflict
    }

    /// Check if an external collaborator could not be reached
    pub fn is_unavailable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }
}
