//! Application state
//!
//! The process-lifetime context for the REST server: built once at startup
//! and cloned into every request.

use std::sync::Arc;

use chat_cache::RedisPool;
use chat_common::JwtService;
use chat_db::PgPool;
use chat_service::{Infrastructure, ServiceContext};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator dependencies
    service_context: Arc<ServiceContext>,
    /// Bearer token validation
    jwt: Arc<JwtService>,
    /// Backing connections probed by the readiness check
    pool: Option<PgPool>,
    redis: Option<RedisPool>,
}

impl AppState {
    /// Create state over a service context without backing connections
    pub fn new(service_context: ServiceContext, jwt: JwtService) -> Self {
        Self {
            service_context: Arc::new(service_context),
            jwt: Arc::new(jwt),
            pool: None,
            redis: None,
        }
    }

    /// Create state from connected infrastructure
    pub fn from_infrastructure(infra: Infrastructure, jwt: JwtService) -> Self {
        Self {
            service_context: Arc::new(infra.context),
            jwt: Arc::new(jwt),
            pool: Some(infra.pool),
            redis: Some(infra.redis),
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    pub fn redis(&self) -> Option<&RedisPool> {
        self.redis.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("pool", &self.pool.is_some())
            .field("redis", &self.redis.as_ref().map(RedisPool::url))
            .finish()
    }
}
