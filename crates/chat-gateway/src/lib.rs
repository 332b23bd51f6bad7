//! # chat-gateway
//!
//! Session gateway for real-time delivery.
//!
//! - [`connection`]: the per-process registry of live sessions
//! - [`broadcast`]: the listener that turns bus envelopes into socket writes
//! - [`handlers`]: client-originated ephemeral events (typing, status)
//! - [`server`]: the WebSocket endpoint and process wiring

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use broadcast::BroadcastListener;
pub use connection::{Connection, ConnectionRegistry};
pub use server::{create_app, create_gateway_state, run, GatewayState};
