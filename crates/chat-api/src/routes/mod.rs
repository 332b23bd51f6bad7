//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::handlers::{conversations, health, messages, reactions, receipts};
use crate::state::AppState;

/// Create the main API router (health routes are mounted separately so they
/// bypass rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(conversation_routes())
        .merge(message_routes())
}

/// Conversation routes
fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            get(conversations::list_conversations).post(conversations::create_group),
        )
        .route(
            "/conversations/:conversation_id/participants",
            get(conversations::get_participants),
        )
        .route(
            "/conversations/:conversation_id/messages",
            get(conversations::get_history),
        )
        .route(
            "/conversations/:conversation_id/typing",
            post(conversations::typing_indicator),
        )
}

/// Message routes
fn message_routes() -> Router<AppState> {
    Router::new()
        .route("/messages", post(messages::send_message))
        .route(
            "/messages/:message_id",
            patch(messages::edit_message).delete(messages::delete_message),
        )
        // Reactions
        .route("/messages/:message_id/reactions", get(reactions::get_reactions))
        .route(
            "/messages/:message_id/reactions/:reaction",
            put(reactions::add_reaction).delete(reactions::remove_reaction),
        )
        // Read receipts
        .route("/messages/:message_id/read", post(receipts::mark_as_read))
        .route("/messages/:message_id/reads", get(receipts::get_readers))
}
