//! Typing indicator handler

use super::HandlerResult;
use crate::connection::Connection;
use crate::server::GatewayState;
use chat_service::dto::TypingRequest;
use chat_service::PresenceService;

/// Handles `typing` frames
pub struct TypingHandler;

impl TypingHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Connection,
        request: TypingRequest,
    ) -> HandlerResult<()> {
        let conversation_id = request.conversation_id;
        let recipients = PresenceService::new(state.service_context())
            .typing(connection.user_id(), connection.username(), request)
            .await?;

        tracing::trace!(
            session_id = %connection.session_id(),
            conversation_id = %conversation_id,
            recipients,
            "Typing indicator forwarded"
        );

        Ok(())
    }
}
