//! Read receipt handlers

use axum::{extract::State, Json};
use chat_core::{MessageId, ReadMark};
use chat_service::ReadReceiptService;

use crate::extractors::{AuthUser, IdPath};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// Mark a message as read
///
/// POST /messages/{message_id}/read
///
/// Marking one's own message succeeds without recording anything.
pub async fn mark_as_read(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<MessageId>,
) -> ApiResult<NoContent> {
    let service = ReadReceiptService::new(state.service_context());
    service.mark_as_read(message_id, auth.user_id).await?;
    Ok(NoContent)
}

/// Who has read a message
///
/// GET /messages/{message_id}/reads
pub async fn get_readers(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<MessageId>,
) -> ApiResult<Json<Vec<ReadMark>>> {
    let service = ReadReceiptService::new(state.service_context());
    let readers = service.readers(message_id, auth.user_id).await?;
    Ok(Json(readers))
}
