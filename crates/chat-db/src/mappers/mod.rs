//! Model to entity mappers
//!
//! `From<Model> for Entity` converts database rows to domain objects;
//! `*Insert` structs prepare entity data for database operations.

mod conversation;
mod message;
mod reaction;

pub use message::MessageInsert;
