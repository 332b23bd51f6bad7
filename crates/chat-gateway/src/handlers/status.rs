//! Status change handler

use super::HandlerResult;
use crate::connection::Connection;
use crate::server::GatewayState;
use chat_service::dto::StatusRequest;
use chat_service::PresenceService;

/// Handles `status` frames
pub struct StatusHandler;

impl StatusHandler {
    pub async fn handle(
        state: &GatewayState,
        connection: &Connection,
        request: StatusRequest,
    ) -> HandlerResult<()> {
        let recipients = PresenceService::new(state.service_context())
            .update_status(connection.user_id(), connection.username(), request)
            .await?;

        tracing::debug!(
            user_id = %connection.user_id(),
            recipients,
            "Status change forwarded"
        );

        Ok(())
    }
}
