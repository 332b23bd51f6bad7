//! Domain entities - core business objects

mod conversation;
mod message;
mod reaction;
mod read_mark;

pub use conversation::{Conversation, ConversationSummary, Participant};
pub use message::{Attachment, Message, MessageKind, NewMessage, MAX_CONTENT_LENGTH};
pub use reaction::{Reaction, MAX_REACTION_LENGTH};
pub use read_mark::ReadMark;
