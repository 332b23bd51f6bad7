//! Broadcast envelope
//!
//! The envelope is the only thing that crosses the bus. It is a tagged union
//! keyed by `type`, flattened next to the list of recipients:
//!
//! ```json
//! { "type": "message_delete", "payload": { "message_id": 7 }, "recipient_ids": [1, 2] }
//! ```
//!
//! `message` and `message_edit` carry the full record under `message`; every
//! other kind carries its body under `payload`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Topic;
use crate::entities::{Message, ReadMark, Reaction};
use crate::error::DomainError;
use crate::value_objects::{ConversationId, MessageId, UserId};

/// Tombstone body for a deleted message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDeleted {
    pub message_id: MessageId,
}

/// Typing indicator body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingIndicator {
    pub conversation_id: ConversationId,
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    pub is_typing: bool,
}

/// Presence status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Offline,
    Away,
}

impl PresenceStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Away => "away",
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "away" => Ok(Self::Away),
            other => Err(DomainError::ValidationError(format!("invalid status: {other}"))),
        }
    }
}

/// Presence change body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub username: String,
    pub status: PresenceStatus,
}

/// Event kind with its kind-specific body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BroadcastEvent {
    Message { message: Message },
    MessageEdit { message: Message },
    MessageDelete { payload: MessageDeleted },
    Typing { payload: TypingIndicator },
    Status { payload: StatusChange },
    ReactionAdd { payload: Reaction },
    ReactionRemove { payload: Reaction },
    ReadReceipt { payload: ReadMark },
}

impl BroadcastEvent {
    /// Wire name of the kind (the `type` tag)
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Message { .. } => "message",
            Self::MessageEdit { .. } => "message_edit",
            Self::MessageDelete { .. } => "message_delete",
            Self::Typing { .. } => "typing",
            Self::Status { .. } => "status",
            Self::ReactionAdd { .. } => "reaction_add",
            Self::ReactionRemove { .. } => "reaction_remove",
            Self::ReadReceipt { .. } => "read_receipt",
        }
    }

    /// Topic this kind is published on
    pub const fn topic(&self) -> Topic {
        match self {
            Self::Message { .. } | Self::MessageEdit { .. } | Self::MessageDelete { .. } => {
                Topic::Message
            }
            Self::Typing { .. } => Topic::Typing,
            Self::Status { .. } => Topic::Status,
            Self::ReactionAdd { .. } | Self::ReactionRemove { .. } => Topic::Reaction,
            Self::ReadReceipt { .. } => Topic::ReadReceipt,
        }
    }
}

/// Event plus the users it should reach
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastEnvelope {
    #[serde(flatten)]
    pub event: BroadcastEvent,
    pub recipient_ids: Vec<UserId>,
}

impl BroadcastEnvelope {
    #[must_use]
    pub fn new(event: BroadcastEvent, recipient_ids: Vec<UserId>) -> Self {
        Self {
            event,
            recipient_ids,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.event.kind()
    }

    pub fn topic(&self) -> Topic {
        self.event.topic()
    }

    /// Serialize to the JSON frame that goes on the bus and to clients
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(self).map_err(|e| DomainError::InternalError(e.to_string()))
    }

    /// Decode a frame received from the bus
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
