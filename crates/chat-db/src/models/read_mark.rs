//! Read receipt database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for message_reads table
#[derive(Debug, Clone, FromRow)]
pub struct ReadMarkModel {
    pub message_id: i64,
    pub user_id: i64,
    pub read_at: DateTime<Utc>,
}
