//! Ports implemented by the infrastructure crates

mod collaborators;
mod repositories;

pub use collaborators::{EventPublisher, UserDirectory};
pub use repositories::{
    ConversationRepository, MessageRepository, ReactionRepository, ReadReceiptRepository,
    RepoResult,
};
