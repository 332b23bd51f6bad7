//! # chat-core
//!
//! Domain layer containing typed identifiers, chat entities, broadcast envelopes,
//! and the ports (repository, directory, and publisher traits) the rest of the
//! workspace plugs into. This crate has zero dependencies on infrastructure.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, Conversation, ConversationSummary, Message, MessageKind, NewMessage,
    Participant, ReadMark, Reaction, MAX_CONTENT_LENGTH, MAX_REACTION_LENGTH,
};
pub use error::{DomainError, ErrorKind};
pub use events::{
    BroadcastEnvelope, BroadcastEvent, MessageDeleted, PresenceStatus, StatusChange, Topic,
    TypingIndicator,
};
pub use traits::{
    ConversationRepository, EventPublisher, MessageRepository, ReactionRepository,
    ReadReceiptRepository, RepoResult, UserDirectory,
};
pub use value_objects::{ConversationId, IdParseError, MessageId, ReactionId, UserId};
