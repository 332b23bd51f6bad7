//! PostgreSQL implementation of ReactionRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::Reaction;
use chat_core::traits::{ReactionRepository, RepoResult};
use chat_core::value_objects::{MessageId, UserId};

use crate::models::ReactionModel;

use super::error::map_db_error;

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self))]
    async fn add(
        &self,
        message_id: MessageId,
        user_id: UserId,
        reaction: &str,
    ) -> RepoResult<Reaction> {
        // The no-op update locks the existing row so a losing concurrent insert still returns it
        let model = sqlx::query_as::<_, ReactionModel>(
            r#"
            INSERT INTO message_reactions (message_id, user_id, reaction)
            VALUES ($1, $2, $3)
            ON CONFLICT (message_id, user_id, reaction)
                DO UPDATE SET reaction = EXCLUDED.reaction
            RETURNING id, message_id, user_id, reaction, created_at
            "#,
        )
        .bind(message_id.into_inner())
        .bind(user_id.into_inner())
        .bind(reaction)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Reaction::from(model))
    }

    #[instrument(skip(self))]
    async fn remove(
        &self,
        message_id: MessageId,
        user_id: UserId,
        reaction: &str,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM message_reactions
            WHERE message_id = $1 AND user_id = $2 AND reaction = $3
            "#,
        )
        .bind(message_id.into_inner())
        .bind(user_id.into_inner())
        .bind(reaction)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn find_by_message(&self, message_id: MessageId) -> RepoResult<Vec<Reaction>> {
        let results = sqlx::query_as::<_, ReactionModel>(
            r#"
            SELECT id, message_id, user_id, reaction, created_at
            FROM message_reactions
            WHERE message_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(message_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Reaction::from).collect())
    }
}
