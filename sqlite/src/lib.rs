//! SQLite storage provider for model-query.
//!
//! - **`database`**: [`LocalDatabase`], the local
//!   [`StorageProvider`](model_query_core::StorageProvider) over a
//!   `rusqlite` connection
//! - **`migration`**: [`SchemaPlan`] and [`SchemaMigration`] for creating,
//!   dropping and inspecting model tables
//! - **`convert`**: value binding and row buffering
//!
//! # Quick start
//!
//! ```no_run
//! use model_query_sqlite::{LocalDatabase, SchemaMigration, SchemaPlan};
//!
//! let db = LocalDatabase::open("app.db").unwrap();
//! let plan = SchemaPlan::from_statements(
//!     &["tags"],
//!     &["CREATE TABLE IF NOT EXISTS tags (_id INTEGER PRIMARY KEY, label TEXT)"],
//! );
//! SchemaMigration::new(db.connection()).unwrap().up(&plan).unwrap();
//! ```

mod convert;
mod database;
mod error;
mod migration;

pub use database::LocalDatabase;
pub use error::{Result, SqliteError};
pub use migration::{MigrationStatus, SchemaMigration, SchemaPlan, TableStatus};
