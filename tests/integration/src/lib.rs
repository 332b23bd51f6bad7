//! Integration test utilities for the chat server
//!
//! In-memory implementations of every port, plus helpers for driving the
//! orchestrator, the REST API, and the WebSocket gateway end to end without
//! PostgreSQL or Redis.

pub mod helpers;

pub use fakes::*;
pub use fixtures::*;
pub use helpers::*;
