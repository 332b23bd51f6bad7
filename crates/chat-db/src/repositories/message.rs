//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::{Message, NewMessage};
use chat_core::error::DomainError;
use chat_core::traits::{MessageRepository, RepoResult};
use chat_core::value_objects::{ConversationId, MessageId};

use crate::mappers::MessageInsert;
use crate::models::MessageModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MessageId) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, conversation_id, sender_id, content, message_type,
                   file_url, file_name, file_size, mime_type,
                   created_at, edited_at, deleted_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self, message), fields(conversation_id = %message.conversation_id))]
    async fn create(&self, message: &NewMessage) -> RepoResult<Message> {
        let insert = MessageInsert::new(message);

        let model = sqlx::query_as::<_, MessageModel>(
            r#"
            INSERT INTO messages (conversation_id, sender_id, content, message_type,
                                  file_url, file_name, file_size, mime_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, conversation_id, sender_id, content, message_type,
                      file_url, file_name, file_size, mime_type,
                      created_at, edited_at, deleted_at
            "#,
        )
        .bind(insert.conversation_id)
        .bind(insert.sender_id)
        .bind(insert.content)
        .bind(insert.message_type)
        .bind(insert.file_url)
        .bind(insert.file_name)
        .bind(insert.file_size)
        .bind(insert.mime_type)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Message::from(model))
    }

    #[instrument(skip(self, content))]
    async fn update_content(&self, id: MessageId, content: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET content = $2, edited_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.into_inner())
        .bind(content)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MessageDeleted);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: MessageId) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET deleted_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MessageAlreadyDeleted);
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_conversation(
        &self,
        conversation_id: ConversationId,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Message>> {
        let results = sqlx::query_as::<_, MessageModel>(
            r#"
            SELECT id, conversation_id, sender_id, content, message_type,
                   file_url, file_name, file_size, mime_type,
                   created_at, edited_at, deleted_at
            FROM messages
            WHERE conversation_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(conversation_id.into_inner())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }
}
