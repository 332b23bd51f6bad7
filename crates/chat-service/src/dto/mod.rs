//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for HTTP and gateway inputs
//! - Response DTOs for serializing API outputs

pub mod requests;
pub mod responses;

pub use requests::{
    CreateGroupRequest, EditMessageRequest, Pagination, ReactionRequest, SendMessageRequest,
    StatusRequest, TypingRequest, DEFAULT_CONVERSATION_LIMIT, DEFAULT_HISTORY_LIMIT,
    MAX_PAGE_LIMIT,
};
pub use responses::{
    AffectedResponse, HealthChecks, HealthResponse, ReadinessResponse,
};
