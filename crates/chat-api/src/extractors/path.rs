//! Path parameter extractors
//!
//! Typed ids deserialize straight from the path; a malformed id is reported
//! as a bad path parameter instead of axum's plain-text rejection.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use chat_core::MessageId;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::response::ApiError;

/// Extract typed path parameters
#[derive(Debug, Clone)]
pub struct IdPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for IdPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(inner) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;

        Ok(IdPath(inner))
    }
}

/// Path parameters for a reaction on a message
#[derive(Debug, Clone, Deserialize)]
pub struct ReactionPath {
    pub message_id: MessageId,
    /// Reaction token (URL-decoded)
    pub reaction: String,
}
