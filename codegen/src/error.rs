//! Error types for declaration loading, extraction and code generation.

use std::fmt;
use std::path::PathBuf;

use model_query_core::SemanticType;
use thiserror::Error;

/// A malformed or ambiguous model declaration.
///
/// Every variant names the model (or provider) it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("{kind} declaration has an empty name")]
    EmptyName { kind: &'static str },

    #[error("model '{model}': '{identifier}' is not a valid SQL identifier")]
    InvalidIdentifier { model: String, identifier: String },

    #[error("model '{model}': '{name}' is reserved and cannot be used as a Rust name")]
    ReservedName { model: String, name: String },

    #[error("model '{model}': package '{package}' is not a Rust module path")]
    InvalidPackage { model: String, package: String },

    #[error("provider name '{0}' is not a valid identifier")]
    InvalidProviderName(String),

    #[error("{kind}s '{first}' and '{second}' both generate '{generated}'")]
    NameCollision {
        kind: &'static str,
        first: String,
        second: String,
        generated: String,
    },

    #[error("provider '{0}' is declared more than once")]
    DuplicateProvider(String),

    #[error("provider '{provider}' extends unknown provider '{parent}'")]
    UnknownProviderParent { provider: String, parent: String },

    #[error("provider '{0}' has a cyclic extends chain")]
    ProviderCycle(String),

    #[error("content provider '{0}' has no authority")]
    MissingAuthority(String),

    #[error("model '{0}' is declared more than once")]
    DuplicateModel(String),

    #[error("model '{model}' extends unknown model '{parent}'")]
    UnknownParentModel { model: String, parent: String },

    #[error("model '{0}' has a cyclic extends chain")]
    InheritanceCycle(String),

    #[error("model '{0}' does not name a provider")]
    MissingProvider(String),

    #[error("model '{model}' is bound to unknown provider '{provider}'")]
    UnknownProvider { model: String, provider: String },

    #[error("model '{0}' does not name a package")]
    MissingPackage(String),

    #[error("model '{model}': member '{member}' is declared more than once")]
    DuplicateMember { model: String, member: String },

    #[error("model '{model}': column '{column}' is mapped more than once")]
    DuplicateColumn { model: String, column: String },

    #[error("model '{model}': field '{field}' has no type")]
    MissingType { model: String, field: String },

    #[error("model '{model}': field '{field}' has unsupported type '{ty}'")]
    UnsupportedType {
        model: String,
        field: String,
        ty: String,
    },

    #[error("model '{model}': byte-sequence field '{field}' must be a blob, not {semantic}")]
    BlobMismatch {
        model: String,
        field: String,
        semantic: SemanticType,
    },

    #[error("model '{0}' has no primary key")]
    NoPrimaryKey(String),

    #[error("model '{model}' has {} primary keys: {}", .fields.len(), .fields.join(", "))]
    MultiplePrimaryKeys { model: String, fields: Vec<String> },

    #[error("model '{model}': auto-increment field '{field}' is not the primary key")]
    AutoIncrementWithoutPrimaryKey { model: String, field: String },

    #[error("model '{model}': auto-increment field '{field}' is not an integer")]
    AutoIncrementNotInteger { model: String, field: String },

    #[error("model '{model}': default value of '{field}' does not fit its type")]
    DefaultTypeMismatch { model: String, field: String },

    #[error("model '{model}': foreign key column '{column}' is not a field")]
    UnknownForeignKeyColumn { model: String, column: String },

    #[error("model '{model}': foreign key targets unknown table '{table}'")]
    UnresolvedForeignKey { model: String, table: String },

    #[error("model '{model}': foreign key targets unknown column '{table}.{column}'")]
    UnknownForeignKeyTarget {
        model: String,
        table: String,
        column: String,
    },

    #[error("model '{model}': unique group names unknown column '{column}'")]
    UnknownUniqueColumn { model: String, column: String },

    #[error("provider '{provider}' maps table '{table}' more than once")]
    DuplicateTable { provider: String, table: String },
}

/// Every extraction error found in one pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionErrors(pub Vec<ExtractionError>);

impl ExtractionErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ExtractionError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ExtractionErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} extraction error(s)", self.0.len())?;
        for err in &self.0 {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ExtractionErrors {}

/// Errors raised by the generation pipeline.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Declarations failed validation; nothing was generated.
    #[error("{0}")]
    Extraction(#[from] ExtractionErrors),

    /// Declaration file extension is neither YAML nor JSON.
    #[error("unsupported declaration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Generator configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience alias for results with [`CodegenError`].
pub type Result<T> = std::result::Result<T, CodegenError>;
