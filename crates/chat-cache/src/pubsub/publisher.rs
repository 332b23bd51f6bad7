//! Redis Pub/Sub publisher.
//!
//! Publishes broadcast envelopes on the channel of their topic.

use async_trait::async_trait;
use chat_core::{BroadcastEnvelope, DomainError, EventPublisher, RepoResult};
use redis::AsyncCommands;

use super::channel_name;
use crate::pool::{RedisPool, RedisResult};

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct RedisPublisher {
    pool: RedisPool,
}

impl RedisPublisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish an envelope, returning the number of subscribed instances
    pub async fn publish_envelope(&self, envelope: &BroadcastEnvelope) -> RedisResult<u32> {
        let payload = serde_json::to_string(envelope)?;
        let channel = channel_name(envelope.topic());

        let mut conn = self.pool.get().await?;
        let receivers: u32 = conn.publish(channel, &payload).await?;

        tracing::debug!(
            channel = %channel,
            event_type = %envelope.kind(),
            recipients = envelope.recipient_ids.len(),
            receivers = receivers,
            "Published envelope"
        );

        Ok(receivers)
    }
}

impl std::fmt::Debug for RedisPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPublisher")
            .field("pool", &self.pool)
            .finish()
    }
}

#[async_trait]
impl EventPublisher for RedisPublisher {
    async fn publish(&self, envelope: &BroadcastEnvelope) -> RepoResult<()> {
        self.publish_envelope(envelope)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::EventBusError(e.to_string()))
    }
}
