//! Service context - dependency container for services
//!
//! Built once at startup and shared by every request and session task for the
//! lifetime of the process. Tests build one around in-memory ports.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chat_common::ChatConfig;
use chat_core::traits::{
    ConversationRepository, EventPublisher, MessageRepository, ReactionRepository,
    ReadReceiptRepository, RepoResult, UserDirectory,
};
use chat_core::{BroadcastEnvelope, DomainError, UserId};
use tracing::{debug, warn};

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// Provides access to:
/// - Storage ports for conversations, messages, reactions and read marks
/// - The identity directory used to validate user ids
/// - The event publisher used for fan-out
/// - The timeout every downstream call is bounded by
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    conversation_repo: Arc<dyn ConversationRepository>,
    message_repo: Arc<dyn MessageRepository>,
    reaction_repo: Arc<dyn ReactionRepository>,
    read_receipt_repo: Arc<dyn ReadReceiptRepository>,

    // Collaborators
    user_directory: Arc<dyn UserDirectory>,
    publisher: Arc<dyn EventPublisher>,

    call_timeout: Duration,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn conversation_repo(&self) -> &dyn ConversationRepository {
        self.conversation_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn reaction_repo(&self) -> &dyn ReactionRepository {
        self.reaction_repo.as_ref()
    }

    pub fn read_receipt_repo(&self) -> &dyn ReadReceiptRepository {
        self.read_receipt_repo.as_ref()
    }

    // === Collaborators ===

    pub fn user_directory(&self) -> &dyn UserDirectory {
        self.user_directory.as_ref()
    }

    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    // === Bounded calls ===

    /// Run a storage or directory call under the call timeout.
    ///
    /// Elapse surfaces as `DomainError::Timeout`, which the boundary reports
    /// as unavailable.
    pub async fn bounded<T, F>(&self, operation: &'static str, call: F) -> ServiceResult<T>
    where
        F: Future<Output = RepoResult<T>>,
    {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => {
                warn!(
                    operation,
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Downstream call timed out"
                );
                Err(DomainError::Timeout(operation.to_string()).into())
            }
        }
    }

    /// Check a single user against the directory.
    ///
    /// Fails closed: an unreachable or slow directory reads as "no such user".
    pub async fn user_exists(&self, user_id: UserId) -> bool {
        match tokio::time::timeout(self.call_timeout, self.user_directory.user_exists(user_id))
            .await
        {
            Ok(exists) => exists,
            Err(_) => {
                warn!(user_id = %user_id, "User lookup timed out, treating as missing");
                false
            }
        }
    }

    // === Fan-out ===

    /// Publish an envelope; failures are logged and swallowed.
    ///
    /// The mutation that produced the envelope has already been persisted, so
    /// a delivery problem must never surface as a failed operation.
    pub async fn broadcast(&self, envelope: BroadcastEnvelope) {
        if envelope.recipient_ids.is_empty() {
            debug!(kind = envelope.kind(), "No recipients, skipping broadcast");
            return;
        }

        let kind = envelope.kind();
        let topic = envelope.topic();
        let recipients = envelope.recipient_ids.len();

        match tokio::time::timeout(self.call_timeout, self.publisher.publish(&envelope)).await {
            Ok(Ok(())) => debug!(kind, topic = %topic, recipients, "Envelope published"),
            Ok(Err(e)) => warn!(kind, topic = %topic, error = %e, "Failed to publish envelope"),
            Err(_) => warn!(kind, topic = %topic, "Publishing envelope timed out"),
        }
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("user_directory", &"dyn UserDirectory")
            .field("publisher", &"dyn EventPublisher")
            .field("call_timeout", &self.call_timeout)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    conversation_repo: Option<Arc<dyn ConversationRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    reaction_repo: Option<Arc<dyn ReactionRepository>>,
    read_receipt_repo: Option<Arc<dyn ReadReceiptRepository>>,
    user_directory: Option<Arc<dyn UserDirectory>>,
    publisher: Option<Arc<dyn EventPublisher>>,
    call_timeout: Duration,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            conversation_repo: None,
            message_repo: None,
            reaction_repo: None,
            read_receipt_repo: None,
            user_directory: None,
            publisher: None,
            call_timeout: ChatConfig::default().request_timeout(),
        }
    }

    pub fn conversation_repo(mut self, repo: Arc<dyn ConversationRepository>) -> Self {
        self.conversation_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn reaction_repo(mut self, repo: Arc<dyn ReactionRepository>) -> Self {
        self.reaction_repo = Some(repo);
        self
    }

    pub fn read_receipt_repo(mut self, repo: Arc<dyn ReadReceiptRepository>) -> Self {
        self.read_receipt_repo = Some(repo);
        self
    }

    pub fn user_directory(mut self, directory: Arc<dyn UserDirectory>) -> Self {
        self.user_directory = Some(directory);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            conversation_repo: self
                .conversation_repo
                .ok_or_else(|| ServiceError::validation("conversation_repo is required"))?,
            message_repo: self
                .message_repo
                .ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            reaction_repo: self
                .reaction_repo
                .ok_or_else(|| ServiceError::validation("reaction_repo is required"))?,
            read_receipt_repo: self
                .read_receipt_repo
                .ok_or_else(|| ServiceError::validation("read_receipt_repo is required"))?,
            user_directory: self
                .user_directory
                .ok_or_else(|| ServiceError::validation("user_directory is required"))?,
            publisher: self
                .publisher
                .ok_or_else(|| ServiceError::validation("publisher is required"))?,
            call_timeout: self.call_timeout,
        })
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
