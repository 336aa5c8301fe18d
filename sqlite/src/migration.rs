//! Schema lifecycle: create, drop and inspect model tables.
//!
//! A [`SchemaPlan`] lists the tables of a provider and the statements that
//! create them. Plans come from generated [`Model`] types, from
//! descriptors, or from the `TABLE_NAMES` / `SCHEMA` constants of a
//! generated provider file. [`SchemaMigration`] applies a plan to a
//! connection inside a transaction.
//!
//! # Example
//!
//! ```no_run
//! use model_query_sqlite::{LocalDatabase, SchemaMigration, SchemaPlan};
//!
//! let db = LocalDatabase::open("app.db").unwrap();
//! let plan = SchemaPlan::from_statements(
//!     &["tags"],
//!     &["CREATE TABLE IF NOT EXISTS tags (_id INTEGER PRIMARY KEY, label TEXT)"],
//! );
//! let migration = SchemaMigration::new(db.connection()).unwrap();
//! migration.up(&plan).unwrap();
//! assert!(migration.status(&plan).unwrap().tables_exist());
//! ```

use model_query_core::ddl::{
    DdlOptions, create_index_sql, create_table_sql, creation_order, drop_table_sql,
    is_valid_identifier,
};
use model_query_core::{Model, ModelDescriptor};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, SqliteError};

/// Tables and creation statements for one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaPlan {
    tables: Vec<String>,
    statements: Vec<String>,
}

impl SchemaPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a generated model's table and indexes.
    pub fn with_model<T: Model>(mut self) -> Self {
        self.tables.push(T::TABLE_NAME.to_string());
        self.statements.push(T::create_table_sql().to_string());
        self.statements
            .extend(T::CREATE_INDEXES.iter().map(|s| s.to_string()));
        self
    }

    /// Builds a plan from descriptors, ordering tables so foreign-key
    /// targets come first.
    pub fn from_descriptors(models: &[&ModelDescriptor], options: &DdlOptions) -> Self {
        let ordered = creation_order(models);
        let mut statements: Vec<String> = ordered
            .iter()
            .map(|m| create_table_sql(m, options))
            .collect();
        statements.extend(ordered.iter().flat_map(|m| create_index_sql(m, options)));
        Self {
            tables: ordered.iter().map(|m| m.table_name.clone()).collect(),
            statements,
        }
    }

    /// Builds a plan from a generated provider's `TABLE_NAMES` and `SCHEMA`.
    pub fn from_statements(tables: &[&str], statements: &[&str]) -> Self {
        Self {
            tables: tables.iter().map(|s| s.to_string()).collect(),
            statements: statements.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Tables in creation order.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    fn validate(&self) -> Result<()> {
        match self.tables.iter().find(|t| !is_valid_identifier(t)) {
            Some(table) => Err(SqliteError::InvalidIdentifier(table.clone())),
            None => Ok(()),
        }
    }
}

/// Applies [`SchemaPlan`]s to a connection.
///
/// Mutations run in a transaction: either every statement of a plan
/// succeeds or none are applied.
pub struct SchemaMigration<'a> {
    conn: &'a Connection,
}

impl<'a> SchemaMigration<'a> {
    pub fn new(conn: &'a Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Creates every table and index in the plan.
    ///
    /// Statements generated with `IF NOT EXISTS` make this safe to repeat.
    pub fn up(&self, plan: &SchemaPlan) -> Result<()> {
        plan.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        for statement in plan.statements() {
            debug!(sql = %statement, "create");
            tx.execute_batch(statement).map_err(|e| {
                SqliteError::MigrationError(format!("failed to create tables: {e}"))
            })?;
        }
        tx.commit()?;
        info!(tables = plan.tables().len(), "schema created");
        Ok(())
    }

    /// Drops the plan's tables in reverse creation order.
    pub fn down(&self, plan: &SchemaPlan) -> Result<()> {
        plan.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        for table in plan.tables().iter().rev() {
            let statement = drop_table_sql(table);
            debug!(sql = %statement, "drop");
            tx.execute_batch(&statement).map_err(|e| {
                SqliteError::MigrationError(format!("failed to drop tables: {e}"))
            })?;
        }
        tx.commit()?;
        info!(tables = plan.tables().len(), "schema dropped");
        Ok(())
    }

    /// Drops and recreates every table in the plan.
    pub fn refresh(&self, plan: &SchemaPlan) -> Result<()> {
        self.down(plan)?;
        self.up(plan)
    }

    /// Reports which of the plan's tables exist and how many rows each holds.
    pub fn status(&self, plan: &SchemaPlan) -> Result<MigrationStatus> {
        plan.validate()?;
        let tables = plan
            .tables()
            .iter()
            .map(|name| -> Result<TableStatus> {
                let exists = self.table_exists(name)?;
                let rows = if exists { self.count_rows(name)? } else { 0 };
                Ok(TableStatus {
                    name: name.clone(),
                    exists,
                    rows,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(MigrationStatus { tables })
    }

    fn table_exists(&self, table: &str) -> Result<bool> {
        let mut stmt = self
            .conn
            .prepare("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1")?;
        let count: i64 = stmt.query_row([table], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn count_rows(&self, table: &str) -> Result<usize> {
        let mut stmt = self.conn.prepare(&format!("SELECT COUNT(*) FROM {table}"))?;
        let count: i64 = stmt.query_row([], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Snapshot returned by [`SchemaMigration::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub tables: Vec<TableStatus>,
}

impl MigrationStatus {
    /// Whether every table in the plan exists.
    pub fn tables_exist(&self) -> bool {
        !self.tables.is_empty() && self.tables.iter().all(|t| t.exists)
    }

    pub fn table(&self, name: &str) -> Option<&TableStatus> {
        self.tables.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatus {
    pub name: String,
    pub exists: bool,
    pub rows: usize,
}
