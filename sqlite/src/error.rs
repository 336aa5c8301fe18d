//! Error types for the SQLite provider.

use model_query_core::StorageError;
use thiserror::Error;

/// Errors that can occur while talking to SQLite.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// A stored value has no counterpart in the model value space.
    #[error("conversion error: {0}")]
    ConversionError(String),

    /// Schema lifecycle operation failure.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Table name contains characters other than ASCII alphanumerics and
    /// underscores.
    #[error("invalid identifier '{0}': must contain only alphanumeric characters and underscores")]
    InvalidIdentifier(String),
}

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        StorageError::new(err)
    }
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
