//! # chat-service
//!
//! Application layer: the chat orchestrator. Each service turns a request into
//! storage mutations through the ports in `chat-core`, decides who must hear
//! about it, and hands the resulting envelope to the event bus.

pub mod bootstrap;
pub mod directory;
pub mod dto;
pub mod services;

pub use bootstrap::{connect, Infrastructure};
pub use directory::HttpUserDirectory;
pub use services::{
    ConversationService, MessageService, PresenceService, ReactionService,
    ReadReceiptService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
};
