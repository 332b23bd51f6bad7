//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for message_reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub id: i64,
    pub message_id: i64,
    pub user_id: i64,
    pub reaction: String,
    pub created_at: DateTime<Utc>,
}
