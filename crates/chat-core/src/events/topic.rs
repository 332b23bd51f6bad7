//! Bus topics, statically partitioned by event family

use std::fmt;
use std::str::FromStr;

/// A named publish/subscribe channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Message, edit, and delete events
    Message,
    Typing,
    Status,
    /// Reaction add and remove events
    Reaction,
    ReadReceipt,
}

impl Topic {
    /// Every topic, in subscription order
    pub const ALL: [Topic; 5] = [
        Topic::Message,
        Topic::Typing,
        Topic::Status,
        Topic::Reaction,
        Topic::ReadReceipt,
    ];

    /// Channel name on the bus
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Message => "chat.message",
            Self::Typing => "chat.typing",
            Self::Status => "chat.status",
            Self::Reaction => "chat.reaction",
            Self::ReadReceipt => "chat.read_receipt",
        }
    }
}

/// Error when a channel name is not a known topic
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topic: {0}")]
pub struct TopicParseError(pub String);

impl FromStr for Topic {
    type Err = TopicParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.name() == s)
            .ok_or_else(|| TopicParseError(s.to_string()))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
