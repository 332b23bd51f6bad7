//! In-process event bus.
//!
//! Same contract as the Redis pair (publish on a topic, consume every topic
//! through one receiver) for single-instance deployments and tests. Slow
//! receivers that fall behind skip envelopes (`RecvError::Lagged`).

use async_trait::async_trait;
use chat_core::{BroadcastEnvelope, EventPublisher, RepoResult};
use tokio::sync::broadcast;

use super::{channel_name, ReceivedMessage};

/// Default capacity of the in-process channel
const DEFAULT_CAPACITY: usize = 1024;

/// In-process bus; clones share one channel
#[derive(Clone)]
pub struct LocalBus {
    sender: broadcast::Sender<ReceivedMessage>,
}

impl LocalBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to every topic
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedMessage> {
        self.sender.subscribe()
    }

    /// Number of live receivers
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LocalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBus")
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

#[async_trait]
impl EventPublisher for LocalBus {
    async fn publish(&self, envelope: &BroadcastEnvelope) -> RepoResult<()> {
        let payload = envelope.to_json()?;
        let message =
            ReceivedMessage::from_payload(channel_name(envelope.topic()).to_string(), payload);

        // No receivers means nobody is connected here; not a failure
        if self.sender.send(message).is_err() {
            tracing::trace!(event_type = %envelope.kind(), "No local bus receivers");
        }
        Ok(())
    }
}
