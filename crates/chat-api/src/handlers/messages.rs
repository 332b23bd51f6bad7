//! Message handlers
//!
//! Endpoints for the message lifecycle: send, edit, delete.

use axum::{extract::State, Json};
use chat_core::{Message, MessageId};
use chat_service::dto::{EditMessageRequest, SendMessageRequest};
use chat_service::MessageService;

use crate::extractors::{AuthUser, IdPath, JsonBody};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Send a message to a conversation or, by recipient, to a 1:1 conversation
///
/// POST /messages
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(request): JsonBody<SendMessageRequest>,
) -> ApiResult<Created<Json<Message>>> {
    let service = MessageService::new(state.service_context());
    let message = service.send_message(auth.user_id, request).await?;
    Ok(Created(Json(message)))
}

/// Edit message content
///
/// PATCH /messages/{message_id}
pub async fn edit_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<MessageId>,
    JsonBody(request): JsonBody<EditMessageRequest>,
) -> ApiResult<Json<Message>> {
    let service = MessageService::new(state.service_context());
    let message = service
        .edit_message(message_id, auth.user_id, request)
        .await?;
    Ok(Json(message))
}

/// Soft-delete a message
///
/// DELETE /messages/{message_id}
pub async fn delete_message(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<MessageId>,
) -> ApiResult<NoContent> {
    let service = MessageService::new(state.service_context());
    service.delete_message(message_id, auth.user_id).await?;
    Ok(NoContent)
}
