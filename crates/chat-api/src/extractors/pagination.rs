//! Pagination extractor
//!
//! Extracts `?limit=&offset=` from the query string. Defaults and clamping are
//! applied by the service that consumes the page.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use chat_service::dto::Pagination;
use validator::Validate;

use crate::response::ApiError;

/// Validated offset pagination
#[derive(Debug, Clone, Copy, Default)]
pub struct PageQuery(pub Pagination);

#[async_trait]
impl<S> FromRequestParts<S> for PageQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pagination) = Query::<Pagination>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        pagination.validate()?;
        Ok(PageQuery(pagination))
    }
}
