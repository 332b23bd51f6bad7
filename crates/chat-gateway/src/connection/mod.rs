//! Connection management
//!
//! One live session per user per process, held in a concurrent map.

mod connection;
mod registry;

pub use connection::{Connection, OutboundFrame};
pub use registry::ConnectionRegistry;
