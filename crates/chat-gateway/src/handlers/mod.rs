//! Client event handlers
//!
//! Routes decoded client frames to the orchestrator's ephemeral-event
//! operations.

mod error;
mod status;
mod typing;

pub use error::{HandlerError, HandlerResult};
pub use status::StatusHandler;
pub use typing::TypingHandler;

use crate::connection::Connection;
use crate::protocol::{ClientEvent, ClientFrame};
use crate::server::GatewayState;

/// Dispatch incoming client frames to the appropriate handler
pub struct FrameDispatcher;

impl FrameDispatcher {
    /// Decode and handle one text frame
    pub async fn dispatch_text(
        state: &GatewayState,
        connection: &Connection,
        text: &str,
    ) -> HandlerResult<()> {
        let frame = ClientFrame::from_json(text)?;
        let kind = frame.kind.clone();

        match frame.into_event()? {
            Some(event) => Self::dispatch(state, connection, event).await,
            None => {
                tracing::debug!(
                    session_id = %connection.session_id(),
                    kind = %kind,
                    "Ignoring unhandled frame type"
                );
                Ok(())
            }
        }
    }

    /// Handle a decoded client event
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Connection,
        event: ClientEvent,
    ) -> HandlerResult<()> {
        match event {
            ClientEvent::Typing(request) => TypingHandler::handle(state, connection, request).await,
            ClientEvent::Status(request) => StatusHandler::handle(state, connection, request).await,
        }
    }
}
