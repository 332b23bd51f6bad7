//! Pub/Sub module.
//!
//! Publish/subscribe transport for broadcast envelopes.

mod channels;
mod local;
mod publisher;
mod subscriber;

pub use channels::{all_channels, channel_name, parse_channel, CHANNEL_PREFIX};
pub use local::LocalBus;
pub use publisher::RedisPublisher;
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberResult,
};
