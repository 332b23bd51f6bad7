//! Conversation database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for conversations table
#[derive(Debug, Clone, FromRow)]
pub struct ConversationModel {
    pub id: i64,
    pub is_group: bool,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Conversation list row: conversation, its latest live message (flattened,
/// all nullable), unread count for the viewer, and participant ids
#[derive(Debug, Clone, FromRow)]
pub struct ConversationSummaryModel {
    pub id: i64,
    pub is_group: bool,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_id: Option<i64>,
    pub last_sender_id: Option<i64>,
    pub last_content: Option<String>,
    pub last_message_type: Option<String>,
    pub last_file_url: Option<String>,
    pub last_file_name: Option<String>,
    pub last_file_size: Option<i64>,
    pub last_mime_type: Option<String>,
    pub last_created_at: Option<DateTime<Utc>>,
    pub last_edited_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
    pub participant_ids: Vec<i64>,
}
