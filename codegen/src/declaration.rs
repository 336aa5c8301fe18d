//! Model declaration files.
//!
//! Declarations are the extractor's input: providers with their `extends`
//! chains, and models with their members and field attributes. Files are
//! YAML (`.yml` / `.yaml`) or JSON (`.json`).
//!
//! # Example YAML
//!
//! ```yaml
//! providers:
//!   - name: AppDatabase
//!     extends: LocalDatabaseProvider
//! models:
//!   - name: User
//!     package: crate::models
//!     table: users
//!     provider: AppDatabase
//!     members:
//!       - name: id
//!         type: i64
//!         field: { primary_key: true, auto_increment: true, column: _id }
//!       - name: username
//!         type: String
//!         field: { not_null: true, unique: true }
//!       - name: on_loaded
//!         init: true
//! ```

use std::io::BufReader;
use std::path::Path;

use model_query_core::{CountStrategy, DefaultValue, SemanticType};
use serde::{Deserialize, Serialize};

use crate::error::{CodegenError, Result};

/// Root name for embedded-SQL providers.
pub const LOCAL_ROOT: &str = "LocalDatabaseProvider";
/// Root name for content-style providers.
pub const CONTENT_ROOT: &str = "ContentDatabaseProvider";

/// One declaration file: providers and models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeclarationFile {
    #[serde(default)]
    pub providers: Vec<ProviderDecl>,
    #[serde(default)]
    pub models: Vec<ModelDecl>,
}

/// A storage provider and the provider it extends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderDecl {
    pub name: String,
    /// Another provider, or [`LOCAL_ROOT`] / [`CONTENT_ROOT`].
    pub extends: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<CountStrategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDecl {
    pub name: String,
    /// Module path of the struct, e.g. `crate::models`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Table name; defaults to the model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Parent model whose members, keys and constraints are inherited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Abstract models only exist to be extended.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDecl>,
    /// Multi-column unique constraints, by column name.
    #[serde(default)]
    pub unique: Vec<Vec<String>>,
    #[serde(default)]
    pub members: Vec<MemberDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKeyDecl {
    pub local_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// A struct member. Only members with a `field` block or `init: true`
/// take part in generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberDecl {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<FieldAttrs>,
    /// Method called after a row has been mapped.
    #[serde(default)]
    pub init: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldAttrs {
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub index: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    /// Column name; defaults to the member name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Overrides the semantic type derived from the member type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic: Option<SemanticType>,
}

enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yml" | "yaml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(CodegenError::UnsupportedFormat(path.to_path_buf())),
    }
}

impl DeclarationFile {
    /// Loads a declaration file, picking the parser from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`CodegenError::UnsupportedFormat`] for other extensions, or
    /// the I/O / parse error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = format_of(path)?;
        let reader = BufReader::new(std::fs::File::open(path)?);
        let file = match format {
            Format::Yaml => serde_yaml::from_reader(reader)?,
            Format::Json => serde_json::from_reader(reader)?,
        };
        Ok(file)
    }

    /// Loads and merges several files, in order.
    pub fn load_all<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Result<Self> {
        let mut merged = Self::default();
        for path in paths {
            merged.merge(Self::load(path)?);
        }
        Ok(merged)
    }

    /// Parses YAML text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Appends the providers and models of `other`.
    ///
    /// Duplicates are kept and reported by the extractor.
    pub fn merge(&mut self, other: Self) {
        self.providers.extend(other.providers);
        self.models.extend(other.models);
    }
}
