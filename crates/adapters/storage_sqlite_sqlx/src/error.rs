//! Storage-specific error type wrapping sqlx errors.

use warren_domain::error::FarmError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to (de)serialize a stored JSON value.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value is outside the range the domain allows.
    #[error("invalid stored value: {0}")]
    Decode(String),
}

impl From<StorageError> for FarmError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}

/// Whether `err` reports a violated `UNIQUE` or primary-key constraint.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Map a unique violation to `conflict`, anything else to a storage error.
pub(crate) fn conflict_on_unique(
    err: sqlx::Error,
    conflict: impl FnOnce() -> FarmError,
) -> FarmError {
    if is_unique_violation(&err) {
        conflict()
    } else {
        StorageError::from(err).into()
    }
}
