//! Error handling for signet-store
//!
//! Wraps signet-core ExError with store-specific helpers

use signet_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Like `from_rusqlite`, tagged with the storage call that failed
pub fn query_failed(op: &str, err: rusqlite::Error) -> ExError {
    from_rusqlite(err).with_op(op)
}

/// A stored value that does not decode into the domain model
pub fn corrupt_row(table: &str, entity_id: impl Into<String>, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("decode_row")
        .with_entity_id(entity_id)
        .with_message(format!("Corrupt {} row: {}", table, reason))
}
