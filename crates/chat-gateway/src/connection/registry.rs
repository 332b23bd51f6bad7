//! Connection registry
//!
//! Maps each user to their live session on this process. Uses `DashMap` so
//! session tasks and the broadcast listener can touch it concurrently.

use super::Connection;
use chat_core::UserId;
use dashmap::DashMap;
use std::sync::Arc;

/// Per-process table of user id to live session
///
/// Holds at most one session per user. Lifetime of an entry is tied to the
/// lifetime of its socket; there is no capacity bound or eviction.
pub struct ConnectionRegistry {
    connections: DashMap<UserId, Arc<Connection>>,
}

impl ConnectionRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Create an empty registry wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a session, replacing any existing one for the same user.
    ///
    /// The displaced session is returned but not signalled; its own teardown
    /// goes through [`remove_session`](Self::remove_session) and leaves the
    /// replacement in place.
    pub fn add(&self, connection: Arc<Connection>) -> Option<Arc<Connection>> {
        let user_id = connection.user_id();
        let session_id = connection.session_id().to_string();
        let previous = self.connections.insert(user_id, connection);

        tracing::debug!(
            user_id = %user_id,
            session_id = %session_id,
            replaced = previous.is_some(),
            "Connection registered"
        );

        previous
    }

    /// Close and remove the user's session; no-op when absent
    pub fn remove(&self, user_id: UserId) -> bool {
        match self.connections.remove(&user_id) {
            Some((_, connection)) => {
                connection.close();
                tracing::debug!(
                    user_id = %user_id,
                    session_id = %connection.session_id(),
                    "Connection removed"
                );
                true
            }
            None => false,
        }
    }

    /// Close and remove the user's session only if it is still `session_id`
    pub fn remove_session(&self, user_id: UserId, session_id: &str) -> bool {
        match self
            .connections
            .remove_if(&user_id, |_, connection| connection.session_id() == session_id)
        {
            Some((_, connection)) => {
                connection.close();
                tracing::debug!(
                    user_id = %user_id,
                    session_id = %session_id,
                    "Connection removed"
                );
                true
            }
            None => {
                tracing::trace!(
                    user_id = %user_id,
                    session_id = %session_id,
                    "Session already replaced or removed"
                );
                false
            }
        }
    }

    /// Look up the user's live session
    pub fn lookup(&self, user_id: UserId) -> Option<Arc<Connection>> {
        self.connections.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Check whether the user has a session here
    pub fn contains(&self, user_id: UserId) -> bool {
        self.connections.contains_key(&user_id)
    }

    /// Number of connected users
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Close every session (process shutdown)
    pub fn close_all(&self) -> usize {
        let mut closed = 0;
        self.connections.retain(|_, connection| {
            connection.close();
            closed += 1;
            false
        });

        if closed > 0 {
            tracing::info!(count = closed, "Closed all connections");
        }

        closed
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.connections.len())
            .finish()
    }
}
