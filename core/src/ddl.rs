//! `CREATE TABLE` / `CREATE INDEX` assembly from model descriptors.
//!
//! Column clauses follow declaration order. Foreign keys come next as
//! trailing table constraints, in declaration order, then multi-column
//! `UNIQUE` groups. Per-column indexes are separate statements named
//! `idx_<table>_<column>`.
//!
//! # Example
//!
//! ```
//! use model_query_core::ddl::{DdlOptions, create_table_sql};
//! use model_query_core::{FieldDescriptor, ModelDescriptor, ProviderBinding, SemanticType};
//!
//! let mut id = FieldDescriptor::new("id", SemanticType::Long, "i64");
//! id.is_primary_key = true;
//! id.is_auto_increment = true;
//! id.column_name = "_id".to_string();
//! let mut name = FieldDescriptor::new("name", SemanticType::Text, "String");
//! name.is_not_null = true;
//!
//! let model = ModelDescriptor {
//!     name: "Tag".to_string(),
//!     table_name: "tags".to_string(),
//!     package_path: "crate::models".to_string(),
//!     fields: vec![id, name],
//!     foreign_keys: Vec::new(),
//!     unique_groups: Vec::new(),
//!     provider: ProviderBinding::local("App"),
//!     init_hooks: Vec::new(),
//! };
//!
//! assert_eq!(
//!     create_table_sql(&model, &DdlOptions::default()),
//!     "CREATE TABLE tags (_id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL)"
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::descriptor::{FieldDescriptor, ModelDescriptor};

/// Knobs for DDL assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DdlOptions {
    /// Emit `IF NOT EXISTS` on tables and indexes.
    #[serde(default)]
    pub if_not_exists: bool,
    /// Emit `CREATE INDEX` statements for indexed fields.
    #[serde(default)]
    pub emit_indexes: bool,
}

impl DdlOptions {
    fn guard(&self) -> &'static str {
        if self.if_not_exists {
            "IF NOT EXISTS "
        } else {
            ""
        }
    }
}

/// Whether `name` is usable as a bare SQL identifier.
///
/// Identifiers must be non-empty, contain only ASCII alphanumerics and
/// underscores, and must not start with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Column clause for one field.
pub fn column_sql(field: &FieldDescriptor) -> String {
    let mut sql = format!(
        "{} {}",
        field.column_name,
        field.semantic_type.affinity().as_sql()
    );
    if field.is_primary_key {
        sql.push_str(" PRIMARY KEY");
        if field.is_auto_increment {
            sql.push_str(" AUTOINCREMENT");
        }
    }
    if field.is_not_null {
        sql.push_str(" NOT NULL");
    }
    if field.is_unique && !field.is_primary_key {
        sql.push_str(" UNIQUE");
    }
    if let Some(default) = &field.default_value {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default.to_sql_literal());
    }
    sql
}

/// `CREATE TABLE` statement for `model`.
pub fn create_table_sql(model: &ModelDescriptor, options: &DdlOptions) -> String {
    let mut clauses: Vec<String> = model.fields.iter().map(column_sql).collect();
    clauses.extend(model.foreign_keys.iter().map(|fk| {
        format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            fk.local_column, fk.target_table, fk.target_column
        )
    }));
    clauses.extend(
        model
            .unique_groups
            .iter()
            .map(|group| format!("UNIQUE ({})", group.join(", "))),
    );
    format!(
        "CREATE TABLE {}{} ({})",
        options.guard(),
        model.table_name,
        clauses.join(", ")
    )
}

/// Index name for an indexed column.
pub fn index_name(table: &str, column: &str) -> String {
    format!("idx_{table}_{column}")
}

/// `CREATE INDEX` statements for every indexed field, or none when
/// indexes are disabled.
pub fn create_index_sql(model: &ModelDescriptor, options: &DdlOptions) -> Vec<String> {
    if !options.emit_indexes {
        return Vec::new();
    }
    model
        .fields
        .iter()
        .filter(|f| f.is_indexed && !f.is_primary_key)
        .map(|f| {
            format!(
                "CREATE INDEX {}{} ON {}({})",
                options.guard(),
                index_name(&model.table_name, &f.column_name),
                model.table_name,
                f.column_name
            )
        })
        .collect()
}

/// `DROP TABLE IF EXISTS` statement for `table`.
pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table}")
}

/// Orders models so every foreign-key target is created before the
/// tables that reference it.
///
/// Models keep their input order otherwise. Self references and
/// references to tables outside `models` are ignored; a reference cycle
/// falls back to input order for the remaining models.
pub fn creation_order<'a>(models: &[&'a ModelDescriptor]) -> Vec<&'a ModelDescriptor> {
    let mut pending: Vec<&ModelDescriptor> = models.to_vec();
    let mut ordered: Vec<&ModelDescriptor> = Vec::with_capacity(pending.len());

    while !pending.is_empty() {
        let ready = pending.iter().position(|candidate| {
            candidate.foreign_keys.iter().all(|fk| {
                fk.target_table == candidate.table_name
                    || ordered.iter().any(|m| m.table_name == fk.target_table)
                    || !pending.iter().any(|m| m.table_name == fk.target_table)
            })
        });
        ordered.push(pending.remove(ready.unwrap_or(0)));
    }
    ordered
}
