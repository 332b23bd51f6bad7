//! PostgreSQL implementation of ConversationRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::{Conversation, ConversationSummary};
use chat_core::traits::{ConversationRepository, RepoResult};
use chat_core::value_objects::{ConversationId, UserId};

use crate::models::{ConversationModel, ConversationSummaryModel};

use super::error::map_db_error;

/// PostgreSQL implementation of ConversationRepository
#[derive(Clone)]
pub struct PgConversationRepository {
    pool: PgPool,
}

impl PgConversationRepository {
    /// Create a new PgConversationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PgConversationRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: ConversationId) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, is_group, name, created_at
            FROM conversations
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn find_direct(&self, a: UserId, b: UserId) -> RepoResult<Option<Conversation>> {
        let result = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT id, is_group, name, created_at
            FROM conversations
            WHERE direct_key = $1 AND is_group = FALSE
            "#,
        )
        .bind(Conversation::direct_key(a, b))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Conversation::from))
    }

    #[instrument(skip(self))]
    async fn create_direct(&self, a: UserId, b: UserId) -> RepoResult<Conversation> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Concurrent first contact converges on the row owning the pair key
        let model = sqlx::query_as::<_, ConversationModel>(
            r#"
            INSERT INTO conversations (is_group, name, direct_key)
            VALUES (FALSE, '', $1)
            ON CONFLICT (direct_key) DO UPDATE SET direct_key = EXCLUDED.direct_key
            RETURNING id, is_group, name, created_at
            "#,
        )
        .bind(Conversation::direct_key(a, b))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r#"
            INSERT INTO conversation_participants (conversation_id, user_id)
            VALUES ($1, $2), ($1, $3)
            ON CONFLICT (conversation_id, user_id) DO NOTHING
            "#,
        )
        .bind(model.id)
        .bind(a.into_inner())
        .bind(b.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(Conversation::from(model))
    }

    #[instrument(skip(self))]
    async fn create_group(&self, name: &str) -> RepoResult<Conversation> {
        let model = sqlx::query_as::<_, ConversationModel>(
            r#"
            INSERT INTO conversations (is_group, name)
            VALUES (TRUE, $1)
            RETURNING id, is_group, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Conversation::from(model))
    }

    #[instrument(skip(self))]
    async fn add_participant(&self, id: ConversationId, user_id: UserId) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conversation_participants (conversation_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (conversation_id, user_id) DO NOTHING
            "#,
        )
        .bind(id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn participant_ids(&self, id: ConversationId) -> RepoResult<Vec<UserId>> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT user_id
            FROM conversation_participants
            WHERE conversation_id = $1
            ORDER BY joined_at, user_id
            "#,
        )
        .bind(id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(|(id,)| UserId::new(id)).collect())
    }

    #[instrument(skip(self))]
    async fn is_participant(&self, id: ConversationId, user_id: UserId) -> RepoResult<bool> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM conversation_participants
                WHERE conversation_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(exists.0)
    }

    #[instrument(skip(self))]
    async fn find_by_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Conversation>> {
        let results = sqlx::query_as::<_, ConversationModel>(
            r#"
            SELECT c.id, c.is_group, c.name, c.created_at
            FROM conversations c
            JOIN conversation_participants p ON p.conversation_id = c.id
            WHERE p.user_id = $1
            ORDER BY COALESCE(
                (SELECT MAX(m.created_at) FROM messages m
                 WHERE m.conversation_id = c.id AND m.deleted_at IS NULL),
                c.created_at
            ) DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.into_inner())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Conversation::from).collect())
    }

    #[instrument(skip(self))]
    async fn summaries_for_user(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<ConversationSummary>> {
        let results = sqlx::query_as::<_, ConversationSummaryModel>(
            r#"
            SELECT
                c.id, c.is_group, c.name, c.created_at,
                lm.id AS last_id,
                lm.sender_id AS last_sender_id,
                lm.content AS last_content,
                lm.message_type AS last_message_type,
                lm.file_url AS last_file_url,
                lm.file_name AS last_file_name,
                lm.file_size AS last_file_size,
                lm.mime_type AS last_mime_type,
                lm.created_at AS last_created_at,
                lm.edited_at AS last_edited_at,
                (
                    SELECT COUNT(*) FROM messages m
                    WHERE m.conversation_id = c.id
                      AND m.deleted_at IS NULL
                      AND m.sender_id <> $1
                      AND NOT EXISTS (
                          SELECT 1 FROM message_reads r
                          WHERE r.message_id = m.id AND r.user_id = $1
                      )
                ) AS unread_count,
                (
                    SELECT COALESCE(array_agg(cp.user_id ORDER BY cp.joined_at, cp.user_id), '{}')
                    FROM conversation_participants cp
                    WHERE cp.conversation_id = c.id
                ) AS participant_ids
            FROM conversations c
            JOIN conversation_participants p ON p.conversation_id = c.id AND p.user_id = $1
            LEFT JOIN LATERAL (
                SELECT * FROM messages m
                WHERE m.conversation_id = c.id AND m.deleted_at IS NULL
                ORDER BY m.created_at DESC, m.id DESC
                LIMIT 1
            ) lm ON TRUE
            ORDER BY COALESCE(lm.created_at, c.created_at) DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.into_inner())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ConversationSummary::from).collect())
    }
}
