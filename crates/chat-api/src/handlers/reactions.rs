//! Reaction handlers
//!
//! Endpoints for message reactions.

use axum::{extract::State, Json};
use chat_core::{MessageId, Reaction};
use chat_service::dto::{AffectedResponse, ReactionRequest};
use chat_service::ReactionService;

use crate::extractors::{AuthUser, IdPath, ReactionPath};
use crate::response::ApiResult;
use crate::state::AppState;

/// Add a reaction; repeating the same reaction is a no-op
///
/// PUT /messages/{message_id}/reactions/{reaction}
pub async fn add_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(path): IdPath<ReactionPath>,
) -> ApiResult<Json<Reaction>> {
    let service = ReactionService::new(state.service_context());
    let reaction = service
        .add_reaction(
            path.message_id,
            auth.user_id,
            ReactionRequest {
                reaction: path.reaction,
            },
        )
        .await?;
    Ok(Json(reaction))
}

/// Remove the caller's reaction
///
/// DELETE /messages/{message_id}/reactions/{reaction}
pub async fn remove_reaction(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(path): IdPath<ReactionPath>,
) -> ApiResult<Json<AffectedResponse>> {
    let service = ReactionService::new(state.service_context());
    let affected = service
        .remove_reaction(
            path.message_id,
            auth.user_id,
            ReactionRequest {
                reaction: path.reaction,
            },
        )
        .await?;
    Ok(Json(AffectedResponse { affected }))
}

/// List reactions on a message
///
/// GET /messages/{message_id}/reactions
pub async fn get_reactions(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(message_id): IdPath<MessageId>,
) -> ApiResult<Json<Vec<Reaction>>> {
    let service = ReactionService::new(state.service_context());
    let reactions = service.list_reactions(message_id, auth.user_id).await?;
    Ok(Json(reactions))
}
