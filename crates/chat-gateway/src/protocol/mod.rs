//! Gateway wire protocol
//!
//! Inbound frames are `{"type": ..., "payload": ...}`. Outbound frames are
//! broadcast envelopes, serialized verbatim.

mod frame;

pub use frame::{ClientEvent, ClientFrame};
