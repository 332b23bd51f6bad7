//! Error handling utilities for repositories

use chat_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError.
///
/// Connectivity failures surface as `StorageUnavailable`; anything the
/// database itself rejected stays a `DatabaseError`.
pub fn map_db_error(e: SqlxError) -> DomainError {
    match e {
        SqlxError::PoolTimedOut
        | SqlxError::PoolClosed
        | SqlxError::Io(_)
        | SqlxError::Tls(_)
        | SqlxError::WorkerCrashed => DomainError::StorageUnavailable(e.to_string()),
        other => DomainError::DatabaseError(other.to_string()),
    }
}
