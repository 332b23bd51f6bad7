//! Cross-instance fan-out
//!
//! Consumes envelopes from the event bus and writes them to local sessions.

mod listener;

pub use listener::BroadcastListener;
