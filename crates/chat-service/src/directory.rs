//! HTTP client for the external user service
//!
//! Answers "does this user exist" for the orchestrator. Single lookups fail
//! closed to `false`; batch lookups report the outage.

use std::time::Duration;

use async_trait::async_trait;
use chat_common::IdentityConfig;
use chat_core::{DomainError, RepoResult, UserDirectory, UserId};
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    exists: bool,
}

#[derive(Debug, Serialize)]
struct ExistsBatchRequest<'a> {
    user_ids: &'a [UserId],
}

/// [`UserDirectory`] backed by the user service's internal HTTP API
#[derive(Clone)]
pub struct HttpUserDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUserDirectory {
    /// Create a directory client with a per-request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::InternalError(format!("http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &IdentityConfig) -> Result<Self, DomainError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn single_url(&self, user_id: UserId) -> String {
        format!("{}/internal/users/{user_id}/exists", self.base_url)
    }

    fn batch_url(&self) -> String {
        format!("{}/internal/users/exists", self.base_url)
    }

    async fn fetch_single(&self, user_id: UserId) -> Result<bool, reqwest::Error> {
        let response = self
            .client
            .get(self.single_url(user_id))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }

        let body: ExistsResponse = response.error_for_status()?.json().await?;
        Ok(body.exists)
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    #[instrument(skip(self))]
    async fn user_exists(&self, user_id: UserId) -> bool {
        match self.fetch_single(user_id).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "User service lookup failed, treating as missing");
                false
            }
        }
    }

    #[instrument(skip(self, user_ids), fields(count = user_ids.len()))]
    async fn users_exist(&self, user_ids: &[UserId]) -> RepoResult<bool> {
        if user_ids.is_empty() {
            return Ok(true);
        }

        let response = self
            .client
            .post(self.batch_url())
            .json(&ExistsBatchRequest { user_ids })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| DomainError::DirectoryUnavailable(e.to_string()))?;

        let body: ExistsResponse = response
            .json()
            .await
            .map_err(|e| DomainError::DirectoryUnavailable(e.to_string()))?;

        Ok(body.exists)
    }
}

impl std::fmt::Debug for HttpUserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUserDirectory")
            .field("base_url", &self.base_url)
            .finish()
    }
}
