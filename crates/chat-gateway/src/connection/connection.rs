//! Individual WebSocket session
//!
//! The handle other tasks use to reach a socket: a bounded outbound queue
//! drained by the session's writer task, plus a close signal.

use chat_core::UserId;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Serialized frame shared between every recipient of one envelope
pub type OutboundFrame = Arc<str>;

/// A single authenticated WebSocket session
pub struct Connection {
    /// Unique session ID
    session_id: String,

    /// Authenticated user
    user_id: UserId,

    /// Display name from the token, echoed on ephemeral events
    username: String,

    /// Queue drained by the writer task
    sender: mpsc::Sender<OutboundFrame>,

    /// Flipped once to ask the writer to send a close frame and stop
    close_tx: watch::Sender<bool>,
    close_rx: watch::Receiver<bool>,
}

impl Connection {
    /// Create a new connection handle
    pub fn new(
        session_id: impl Into<String>,
        user_id: UserId,
        username: impl Into<String>,
        sender: mpsc::Sender<OutboundFrame>,
    ) -> Arc<Self> {
        let (close_tx, close_rx) = watch::channel(false);
        Arc::new(Self {
            session_id: session_id.into(),
            user_id,
            username: username.into(),
            sender,
            close_tx,
            close_rx,
        })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// Queue a frame without waiting for space
    pub fn try_send(
        &self,
        frame: OutboundFrame,
    ) -> Result<(), mpsc::error::TrySendError<OutboundFrame>> {
        self.sender.try_send(frame)
    }

    /// Ask the writer task to close the socket
    pub fn close(&self) {
        self.close_tx.send_replace(true);
    }

    /// Receiver the writer task watches; fires once `close` is called, even
    /// if that happened before the receiver was taken
    pub fn close_signal(&self) -> watch::Receiver<bool> {
        self.close_rx.clone()
    }

    /// Whether `close` has been called
    pub fn close_requested(&self) -> bool {
        *self.close_rx.borrow()
    }

    /// Whether the session has been closed or its writer is gone
    pub fn is_closed(&self) -> bool {
        self.close_requested() || self.sender.is_closed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("session_id", &self.session_id)
            .field("user_id", &self.user_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
