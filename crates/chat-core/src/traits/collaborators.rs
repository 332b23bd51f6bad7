//! External collaborator ports: identity directory and event bus

use async_trait::async_trait;

use super::RepoResult;
use crate::events::BroadcastEnvelope;
use crate::value_objects::UserId;

/// Answers "does this user exist" on behalf of the identity system
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Single lookup. Implementations treat an unreachable directory as
    /// "does not exist".
    async fn user_exists(&self, user_id: UserId) -> bool;

    /// Batch lookup; `true` only when every id exists.
    async fn users_exist(&self, user_ids: &[UserId]) -> RepoResult<bool>;
}

/// Publishes envelopes on the bus topic matching their kind
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, envelope: &BroadcastEnvelope) -> RepoResult<()>;
}
