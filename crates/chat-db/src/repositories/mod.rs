//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in chat-core.

mod conversation;
mod error;
mod message;
mod reaction;
mod read_receipt;

pub use conversation::PgConversationRepository;
pub use message::PgMessageRepository;
pub use reaction::PgReactionRepository;
pub use read_receipt::PgReadReceiptRepository;
