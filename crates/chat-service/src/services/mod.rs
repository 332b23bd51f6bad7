//! Business logic services
//!
//! Every operation runs on the caller's task. Storage and directory calls are
//! bounded by the context's call timeout; publishing never fails an operation.

pub mod context;
pub mod conversation;
pub mod error;
pub mod message;
pub mod presence;
pub mod reaction;
pub mod read_receipt;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use conversation::ConversationService;
pub use error::{ServiceError, ServiceResult};
pub use message::MessageService;
pub use presence::PresenceService;
pub use reaction::ReactionService;
pub use read_receipt::ReadReceiptService;
