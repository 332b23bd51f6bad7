//! Handler error types

use thiserror::Error;

/// Handler error type
///
/// Handler failures are reported in the logs only; the socket stays open.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Frame or payload could not be decoded
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The orchestrator rejected the event
    #[error("Service error: {0}")]
    Service(#[from] chat_service::ServiceError),
}

impl HandlerError {
    /// Whether the client caused the failure
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidPayload(_) => true,
            Self::Service(e) => e.is_client_error(),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(err.to_string())
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
