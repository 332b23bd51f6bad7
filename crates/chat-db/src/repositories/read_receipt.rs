//! PostgreSQL implementation of ReadReceiptRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::ReadMark;
use chat_core::traits::{ReadReceiptRepository, RepoResult};
use chat_core::value_objects::{MessageId, UserId};

use crate::models::ReadMarkModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ReadReceiptRepository
#[derive(Clone)]
pub struct PgReadReceiptRepository {
    pool: PgPool,
}

impl PgReadReceiptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadReceiptRepository for PgReadReceiptRepository {
    #[instrument(skip(self))]
    async fn mark_read(&self, message_id: MessageId, user_id: UserId) -> RepoResult<ReadMark> {
        // Keeps the first read_at on repeat marks
        let model = sqlx::query_as::<_, ReadMarkModel>(
            r#"
            INSERT INTO message_reads (message_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (message_id, user_id)
                DO UPDATE SET read_at = message_reads.read_at
            RETURNING message_id, user_id, read_at
            "#,
        )
        .bind(message_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ReadMark::from(model))
    }

    #[instrument(skip(self))]
    async fn readers_of(&self, message_id: MessageId) -> RepoResult<Vec<ReadMark>> {
        let results = sqlx::query_as::<_, ReadMarkModel>(
            r#"
            SELECT message_id, user_id, read_at
            FROM message_reads
            WHERE message_id = $1
            ORDER BY read_at
            "#,
        )
        .bind(message_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ReadMark::from).collect())
    }
}
