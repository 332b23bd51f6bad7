//! Conversation handlers
//!
//! Endpoints for listing conversations, creating groups, and reading history.

use axum::{extract::State, Json};
use chat_core::{Conversation, ConversationId, ConversationSummary, Message, UserId};
use chat_service::dto::{CreateGroupRequest, TypingRequest};
use chat_service::{ConversationService, MessageService, PresenceService};
use serde::Deserialize;

use crate::extractors::{AuthUser, IdPath, PageQuery, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// List the caller's conversations, most recently active first
///
/// GET /conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
    PageQuery(page): PageQuery,
) -> ApiResult<Json<Vec<ConversationSummary>>> {
    let service = ConversationService::new(state.service_context());
    let conversations = service.list_conversations(auth.user_id, page).await?;
    Ok(Json(conversations))
}

/// Create a group conversation
///
/// POST /conversations
pub async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateGroupRequest>,
) -> ApiResult<Created<Json<Conversation>>> {
    let service = ConversationService::new(state.service_context());
    let conversation = service.create_group(auth.user_id, request).await?;
    Ok(Created(Json(conversation)))
}

/// List participant ids
///
/// GET /conversations/{conversation_id}/participants
pub async fn get_participants(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(conversation_id): IdPath<ConversationId>,
) -> ApiResult<Json<Vec<UserId>>> {
    let service = ConversationService::new(state.service_context());
    let participants = service.participants(conversation_id, auth.user_id).await?;
    Ok(Json(participants))
}

/// Message history, newest first, deleted messages excluded
///
/// GET /conversations/{conversation_id}/messages
pub async fn get_history(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(conversation_id): IdPath<ConversationId>,
    PageQuery(page): PageQuery,
) -> ApiResult<Json<Vec<Message>>> {
    let service = MessageService::new(state.service_context());
    let messages = service.history(conversation_id, auth.user_id, page).await?;
    Ok(Json(messages))
}

/// Body of the REST typing endpoint; the conversation comes from the path
#[derive(Debug, Default, Deserialize)]
pub struct TypingBody {
    #[serde(default = "default_true")]
    pub is_typing: bool,
}

fn default_true() -> bool {
    true
}

/// Typing indicator for clients without a gateway socket
///
/// POST /conversations/{conversation_id}/typing
pub async fn typing_indicator(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(conversation_id): IdPath<ConversationId>,
    body: Option<Json<TypingBody>>,
) -> ApiResult<NoContent> {
    let is_typing = body.map_or(true, |Json(body)| body.is_typing);

    let service = PresenceService::new(state.service_context());
    service
        .typing(
            auth.user_id,
            &auth.username,
            TypingRequest {
                conversation_id,
                is_typing,
            },
        )
        .await?;
    Ok(NoContent)
}
