//! Error types for clause compilation, row mapping and query execution.
//!
//! Each failure class has its own type so callers can tell a malformed
//! clause tree apart from a row that failed to map or a storage backend
//! that rejected a statement. [`QueryError`] wraps all of them for the
//! query builder facade.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::clause::Operator;

/// Errors raised while compiling a clause tree into SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// `IN` clause with an empty value list.
    #[error("IN clause on column '{0}' has no values")]
    EmptyInList(String),

    /// `AND` / `OR` group without children.
    #[error("{0} clause has no children")]
    EmptyGroup(&'static str),

    /// Ordering or pattern operator compared against `NULL`.
    #[error("operator {op} on column '{column}' cannot compare against NULL")]
    NullComparison { column: String, op: Operator },

    /// `BETWEEN` with a `NULL` bound.
    #[error("BETWEEN on column '{0}' has a NULL bound")]
    NullBound(String),

    /// Value type that cannot be bound as a clause argument.
    #[error("column '{column}' cannot be compared against a {found} value")]
    UnsupportedValue { column: String, found: &'static str },

    /// Clause references an empty column name.
    #[error("clause references an empty column name")]
    EmptyColumn,
}

/// Errors raised while mapping a storage row onto a model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The row does not contain an expected column.
    #[error("missing column '{0}' in row")]
    MissingColumn(String),

    /// The cell holds a value of the wrong storage class.
    #[error("column '{column}': cannot convert {found} to {expected}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An integer cell does not fit the target field type.
    #[error("column '{column}': value {value} out of range for {expected}")]
    OutOfRange {
        column: String,
        expected: &'static str,
        value: i64,
    },
}

/// Query features that content-style providers cannot express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Join,
    GroupBy,
    Having,
    Limit,
    RawQuery,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Join => "join clause",
            Self::GroupBy => "group by clause",
            Self::Having => "having clause",
            Self::Limit => "limit clause",
            Self::RawQuery => "raw query",
        })
    }
}

/// A request used a feature the resolved provider does not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{feature} is not supported by content-style providers")]
pub struct UnsupportedOperation {
    pub feature: Feature,
}

impl UnsupportedOperation {
    pub const fn new(feature: Feature) -> Self {
        Self { feature }
    }
}

/// Opaque error produced by a storage provider.
///
/// The core never inspects or retries these; the provider's own error is
/// kept as the source and can be recovered with
/// [`downcast_ref`](Self::downcast_ref).
#[derive(Debug)]
pub struct StorageError {
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl StorageError {
    /// Wraps a provider error.
    pub fn new(err: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            inner: Box::new(err),
        }
    }

    /// Creates an error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self {
            inner: message.into(),
        }
    }

    /// Returns the wrapped error if it is of type `E`.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref::<E>()
    }

    /// Consumes the wrapper and returns the provider error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.inner
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for StorageError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

impl From<UnsupportedOperation> for StorageError {
    fn from(err: UnsupportedOperation) -> Self {
        Self::new(err)
    }
}

/// Errors surfaced by the query builder facade.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The clause tree could not be compiled.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// The provider cannot express part of the request.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperation),

    /// A returned row could not be mapped onto the model.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// The storage provider failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// An execution method was invoked on a builder that already ran.
    #[error("{0} builder has already been executed")]
    AlreadyExecuted(&'static str),

    /// An update was issued without any column values.
    #[error("update on table '{0}' has no values to set")]
    EmptyUpdate(String),
}

impl QueryError {
    /// Returns the unsupported feature if this error is a capability rejection.
    pub fn unsupported_feature(&self) -> Option<Feature> {
        match self {
            Self::Unsupported(err) => Some(err.feature),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_keeps_provider_error() {
        let err = StorageError::new(UnsupportedOperation::new(Feature::Limit));
        assert_eq!(
            err.to_string(),
            "limit clause is not supported by content-style providers"
        );
        assert_eq!(
            err.downcast_ref::<UnsupportedOperation>().map(|e| e.feature),
            Some(Feature::Limit)
        );
    }

    #[test]
    fn test_storage_error_from_message() {
        let err = StorageError::msg("disk full");
        assert_eq!(err.to_string(), "disk full");
        assert!(err.downcast_ref::<UnsupportedOperation>().is_none());
    }

    #[test]
    fn test_query_error_reports_unsupported_feature() {
        let err = QueryError::from(UnsupportedOperation::new(Feature::GroupBy));
        assert_eq!(err.unsupported_feature(), Some(Feature::GroupBy));
        assert_eq!(QueryError::AlreadyExecuted("select").unsupported_feature(), None);
    }
}
