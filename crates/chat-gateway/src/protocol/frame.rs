//! Client frames

use chat_service::dto::{StatusRequest, TypingRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw frame as sent by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub payload: Value,
}

/// Client-originated events the gateway acts on
#[derive(Debug, Clone)]
pub enum ClientEvent {
    Typing(TypingRequest),
    Status(StatusRequest),
}

impl ClientFrame {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Decode the payload for the frame's kind.
    ///
    /// Kinds the gateway does not handle decode to `Ok(None)`.
    pub fn into_event(self) -> Result<Option<ClientEvent>, serde_json::Error> {
        match self.kind.as_str() {
            "typing" => serde_json::from_value(self.payload)
                .map(ClientEvent::Typing)
                .map(Some),
            "status" => serde_json::from_value(self.payload)
                .map(ClientEvent::Status)
                .map(Some),
            _ => Ok(None),
        }
    }
}

impl ClientEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Typing(_) => "typing",
            Self::Status(_) => "status",
        }
    }
}
