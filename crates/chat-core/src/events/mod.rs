//! Broadcast events - transient envelopes fanned out to connected users

mod envelope;
mod topic;

pub use envelope::{
    BroadcastEnvelope, BroadcastEvent, MessageDeleted, PresenceStatus, StatusChange,
    TypingIndicator,
};
pub use topic::{Topic, TopicParseError};
