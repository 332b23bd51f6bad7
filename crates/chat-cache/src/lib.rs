//! # chat-cache
//!
//! Event bus adapters for cross-instance fan-out.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Publisher**: `EventPublisher` over Redis `PUBLISH`, one channel per topic
//! - **Subscriber**: Reconnecting Redis subscription to every topic, re-broadcast in-process
//! - **Local bus**: In-process bus with the same contract, for single-instance runs and tests
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::{RedisPool, RedisPoolConfig, RedisPublisher, SubscriberBuilder};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = RedisPublisher::new(pool.clone());
//!
//! let subscriber = SubscriberBuilder::new()
//!     .redis_url("redis://127.0.0.1:6379")
//!     .subscribe_all_topics()
//!     .build()
//!     .await?;
//! let mut rx = subscriber.receiver();
//! ```

pub mod pool;
pub mod pubsub;

// Re-export pool types
pub use pool::{
    RedisPool, RedisPoolConfig, RedisPoolError, RedisResult,
};

// Re-export pubsub types
pub use pubsub::{
    channel_name, parse_channel, LocalBus, ReceivedMessage, RedisPublisher, Subscriber,
    SubscriberBuilder, SubscriberConfig, SubscriberError, SubscriberResult, CHANNEL_PREFIX,
};
