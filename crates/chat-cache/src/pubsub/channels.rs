//! Pub/Sub channel naming.
//!
//! Every topic maps to exactly one Redis channel. Topic names already carry
//! the `chat.` namespace, so the channel name is the topic name.

use chat_core::Topic;

/// Namespace shared by all chat channels
pub const CHANNEL_PREFIX: &str = "chat.";

/// Redis channel for a topic
#[must_use]
pub fn channel_name(topic: Topic) -> &'static str {
    topic.name()
}

/// Map a Redis channel back to its topic, `None` for foreign channels
#[must_use]
pub fn parse_channel(name: &str) -> Option<Topic> {
    if !name.starts_with(CHANNEL_PREFIX) {
        return None;
    }
    name.parse().ok()
}

/// Channel names for the full topic set
#[must_use]
pub fn all_channels() -> Vec<&'static str> {
    Topic::ALL.iter().map(|t| channel_name(*t)).collect()
}
