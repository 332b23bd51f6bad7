//! Startup wiring shared by both binaries
//!
//! Connects PostgreSQL and Redis, builds the Postgres repositories, the
//! directory client and the Redis publisher, and assembles the
//! [`ServiceContext`].

use std::sync::Arc;

use chat_cache::{RedisPool, RedisPublisher};
use chat_common::{AppConfig, AppError};
use chat_db::{
    PgConversationRepository, PgMessageRepository, PgPool, PgReactionRepository,
    PgReadReceiptRepository,
};
use tracing::info;

use crate::directory::HttpUserDirectory;
use crate::services::ServiceContext;

/// Live connections owned by a running process
#[derive(Clone)]
pub struct Infrastructure {
    pub context: ServiceContext,
    pub pool: PgPool,
    pub redis: RedisPool,
}

impl std::fmt::Debug for Infrastructure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Infrastructure")
            .field("context", &self.context)
            .field("pool", &"PgPool")
            .field("redis", &self.redis.url())
            .finish()
    }
}

/// Connect to every backing service and build the service context
pub async fn connect(config: &AppConfig) -> Result<Infrastructure, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = chat_db::create_pool(&chat_db::DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        chat_db::run_migrations(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {e}")))?;
        info!("Database migrations applied");
    }

    info!("Connecting to Redis...");
    let redis = RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    info!("Redis pool created");

    let directory = HttpUserDirectory::from_config(&config.identity)
        .map_err(|e| AppError::Config(e.to_string()))?;

    let context = ServiceContext::builder()
        .conversation_repo(Arc::new(PgConversationRepository::new(pool.clone())))
        .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
        .reaction_repo(Arc::new(PgReactionRepository::new(pool.clone())))
        .read_receipt_repo(Arc::new(PgReadReceiptRepository::new(pool.clone())))
        .user_directory(Arc::new(directory))
        .publisher(Arc::new(RedisPublisher::new(redis.clone())))
        .call_timeout(config.chat.request_timeout())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(Infrastructure {
        context,
        pool,
        redis,
    })
}
