//! The local storage provider.
//!
//! [`LocalDatabase`] executes the statements assembled by
//! [`model_query_core::sql`] on a `rusqlite` connection. Foreign keys are
//! enforced on every connection it wraps, and batch inserts run in a
//! single transaction.
//!
//! # Example
//!
//! ```no_run
//! use model_query_core::{Clause, Select};
//! use model_query_sqlite::LocalDatabase;
//! # use model_query_core::{Model, MappingError, Row, Value, Values, ProviderKind};
//! # #[derive(Default)] struct User;
//! # impl Model for User {
//! #     const NAME: &'static str = "User"; const TABLE_NAME: &'static str = "users";
//! #     const COLUMNS: &'static [&'static str] = &["_id"]; const PRIMARY_KEY: &'static str = "_id";
//! #     const PROVIDER: &'static str = "App"; const PROVIDER_KIND: ProviderKind = ProviderKind::Local;
//! #     const CREATE_TABLE: &'static str = ""; const CREATE_INDEXES: &'static [&'static str] = &[];
//! #     fn from_row(_: &Row) -> Result<Self, MappingError> { Ok(User) }
//! #     fn to_values(&self) -> Values { Values::new() }
//! #     fn primary_key(&self) -> Value { Value::Null }
//! #     fn set_primary_key(&mut self, _: &Value) -> Result<(), MappingError> { Ok(()) }
//! # }
//!
//! let db = LocalDatabase::open("app.db").unwrap();
//! let users = Select::<User>::new(&db)
//!     .filter(Clause::eq("_id", 1))
//!     .query_all()
//!     .unwrap();
//! ```

use std::path::Path;

use model_query_core::sql::{
    Statement, count_statement, delete_statement, insert_statement, select_statement,
    update_statement,
};
use model_query_core::{
    CompiledClause, ConflictPolicy, Cursor, ProviderKind, SelectRequest, StorageError,
    StorageProvider, Value, Values,
};
use rusqlite::Connection;
use tracing::debug;

use crate::convert::{params, read_cursor};
use crate::error::{Result, SqliteError};

/// An embedded SQLite database.
pub struct LocalDatabase {
    conn: Connection,
}

impl LocalDatabase {
    /// Opens (or creates) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Wraps an existing connection and turns on foreign-key enforcement.
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Row id of the most recent successful insert on this connection.
    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    fn query(&self, statement: &Statement) -> Result<Cursor> {
        debug!(sql = %statement.sql, args = statement.args.len(), "query");
        let mut stmt = self.conn.prepare(&statement.sql)?;
        read_cursor(&mut stmt, &statement.args)
    }

    fn execute(&self, statement: &Statement) -> Result<u64> {
        debug!(sql = %statement.sql, args = statement.args.len(), "execute");
        let changed = self.conn.execute(&statement.sql, params(&statement.args))?;
        Ok(changed as u64)
    }

    fn insert_all(&self, table: &str, rows: &[Values], policy: ConflictPolicy) -> Result<u64> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        for values in rows {
            let statement = insert_statement(table, values, policy);
            debug!(sql = %statement.sql, args = statement.args.len(), "insert");
            inserted += tx.execute(&statement.sql, params(&statement.args))? as u64;
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn count(&self, table: &str, selection: &CompiledClause) -> Result<u64> {
        let statement = count_statement(table, selection);
        debug!(sql = %statement.sql, args = statement.args.len(), "count");
        let count: i64 = self
            .conn
            .query_row(&statement.sql, params(&statement.args), |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| SqliteError::ConversionError(format!("negative row count {count}")))
    }
}

impl StorageProvider for LocalDatabase {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    fn execute_select(&self, request: &SelectRequest) -> std::result::Result<Cursor, StorageError> {
        Ok(self.query(&select_statement(request))?)
    }

    fn execute_insert(
        &self,
        table: &str,
        rows: &[Values],
        policy: ConflictPolicy,
    ) -> std::result::Result<u64, StorageError> {
        Ok(self.insert_all(table, rows, policy)?)
    }

    fn execute_update(
        &self,
        table: &str,
        values: &Values,
        selection: &CompiledClause,
    ) -> std::result::Result<u64, StorageError> {
        Ok(self.execute(&update_statement(table, values, selection))?)
    }

    fn execute_delete(
        &self,
        table: &str,
        selection: &CompiledClause,
    ) -> std::result::Result<u64, StorageError> {
        Ok(self.execute(&delete_statement(table, selection))?)
    }

    fn execute_count(
        &self,
        table: &str,
        selection: &CompiledClause,
    ) -> std::result::Result<u64, StorageError> {
        Ok(self.count(table, selection)?)
    }

    fn execute_raw(&self, sql: &str, args: &[Value]) -> std::result::Result<Cursor, StorageError> {
        let statement = Statement {
            sql: sql.to_string(),
            args: args.to_vec(),
        };
        Ok(self.query(&statement)?)
    }
}
