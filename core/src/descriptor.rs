//! Model descriptors: the build-time metadata for one mapped table.
//!
//! Descriptors are plain data produced once by the metadata extractor and
//! shared read-only afterwards. They carry everything the code generator
//! and the DDL assembler need: column names, semantic types, key and
//! constraint flags, foreign keys and the owning provider.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Integer,
    Long,
    Real,
    Text,
    Boolean,
    Blob,
    Uri,
}

impl SemanticType {
    /// Column affinity used in `CREATE TABLE`.
    pub fn affinity(self) -> Affinity {
        match self {
            Self::Integer | Self::Long | Self::Boolean => Affinity::Integer,
            Self::Real => Affinity::Real,
            Self::Text | Self::Uri => Affinity::Text,
            Self::Blob => Affinity::Blob,
        }
    }

    /// Whether an auto-increment key may use this type.
    pub fn is_integral(self) -> bool {
        matches!(self, Self::Integer | Self::Long)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Real => "real",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Blob => "blob",
            Self::Uri => "uri",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL column type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Affinity {
    Integer,
    Real,
    Text,
    Blob,
}

impl Affinity {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        }
    }
}

/// Storage backend family a provider belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Embedded SQL database: joins, grouping, limits and raw SQL available.
    Local,
    /// Content-style row store addressed by resource locator.
    Content,
}

impl ProviderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Content => "content",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a provider answers row counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountStrategy {
    /// Project `COUNT(*)`.
    #[default]
    Projection,
    /// Project the `_count` column exposed by non-SQL content stores.
    CountColumn,
}

/// The provider a model is bound to, with its kind resolved up front.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderBinding {
    pub name: String,
    pub kind: ProviderKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<String>,
    #[serde(default)]
    pub count: CountStrategy,
}

impl ProviderBinding {
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Local,
            authority: None,
            count: CountStrategy::Projection,
        }
    }

    pub fn content(name: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Content,
            authority: Some(authority.into()),
            count: CountStrategy::Projection,
        }
    }

    pub fn with_count(mut self, count: CountStrategy) -> Self {
        self.count = count;
        self
    }
}

/// Literal used in a column `DEFAULT` clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl DefaultValue {
    /// SQL literal spelling; text is single-quoted with quotes doubled.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Bool(v) => i64::from(*v).to_string(),
            Self::Integer(v) => v.to_string(),
            Self::Real(v) => {
                let text = v.to_string();
                if text.contains(['.', 'e', 'E']) || !v.is_finite() {
                    text
                } else {
                    format!("{text}.0")
                }
            }
            Self::Text(v) => format!("'{}'", v.replace('\'', "''")),
        }
    }

    /// Whether this literal can seed a column of `ty`. Non-finite reals
    /// have no SQL literal.
    pub fn fits(&self, ty: SemanticType) -> bool {
        match (self, ty) {
            (Self::Bool(_), SemanticType::Boolean) => true,
            (Self::Integer(v), SemanticType::Boolean) => *v == 0 || *v == 1,
            (Self::Integer(v), SemanticType::Integer) => i32::try_from(*v).is_ok(),
            (Self::Integer(_), SemanticType::Long | SemanticType::Real) => true,
            (Self::Real(v), SemanticType::Real) => v.is_finite(),
            (Self::Text(_), SemanticType::Text | SemanticType::Uri) => true,
            _ => false,
        }
    }
}

/// One persisted field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Rust field name on the model struct.
    pub name: String,
    pub column_name: String,
    #[serde(rename = "type")]
    pub semantic_type: SemanticType,
    /// Declared Rust type, e.g. `Option<String>`.
    pub rust_type: String,
    /// Declared as `Option<_>`.
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub is_primary_key: bool,
    #[serde(default)]
    pub is_auto_increment: bool,
    #[serde(default)]
    pub is_indexed: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub is_not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
}

impl FieldDescriptor {
    /// A plain field whose column name equals its field name.
    pub fn new(name: impl Into<String>, semantic_type: SemanticType, rust_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            column_name: name.clone(),
            name,
            semantic_type,
            rust_type: rust_type.into(),
            nullable: false,
            is_primary_key: false,
            is_auto_increment: false,
            is_indexed: false,
            is_unique: false,
            is_not_null: false,
            default_value: None,
        }
    }

    /// Whether insert/update payloads must always carry this column.
    ///
    /// Not-null columns without a default, and primary keys the backend
    /// does not assign, are always written. Everything else is omitted
    /// when empty so the backend can apply its column default.
    pub fn is_required(&self) -> bool {
        (self.is_not_null && self.default_value.is_none())
            || (self.is_primary_key && !self.is_auto_increment)
    }
}

/// A foreign key from a local column to a column of another table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyDescriptor {
    pub local_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Metadata for one model mapped to one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub name: String,
    pub table_name: String,
    /// Module path of the model struct, used for generated `use` lines.
    pub package_path: String,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
    /// Multi-column unique constraints, by column name.
    #[serde(default)]
    pub unique_groups: Vec<Vec<String>>,
    pub provider: ProviderBinding,
    /// Methods invoked, in order, after a row is mapped.
    #[serde(default)]
    pub init_hooks: Vec<String>,
}

impl ModelDescriptor {
    /// The primary-key field.
    ///
    /// Descriptors built by the extractor always have exactly one.
    pub fn primary_key(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_primary_key)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.column_name == column)
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.column_name.as_str()).collect()
    }
}
