//! Typed SQL query construction driven by model descriptors.
//!
//! This crate holds the runtime half of model-query:
//!
//! - [`ModelDescriptor`] and [`Registry`]: build-time metadata for each
//!   model, shared read-only by the code generator and tools.
//! - [`Clause`] and [`compile`]: the clause algebra and its compiler into
//!   a parameterized SQL fragment plus ordered arguments.
//! - [`ddl`] and [`sql`]: `CREATE TABLE` assembly and statement text for
//!   embedded-SQL backends.
//! - [`StorageProvider`]: the narrow execution interface a backend
//!   implements; [`ContentStore`] adapts content-style row stores to it.
//! - [`query`]: the single-use builders (`Select`, `Insert`, `Update`,
//!   `Delete`, `Count`, `Raw`) used by generated model code.
//!
//! # Example
//!
//! ```
//! use model_query_core::{Clause, compile};
//!
//! let compiled = compile(&Clause::and([
//!     Clause::eq("x", 1),
//!     Clause::or([Clause::eq("y", 2), Clause::eq("y", 3)]),
//! ]))
//! .unwrap();
//!
//! assert_eq!(compiled.sql(), "x = ? AND (y = ? OR y = ?)");
//! assert_eq!(compiled.args().len(), 3);
//! assert!(compile(&Clause::in_list("x", Vec::<i64>::new())).is_err());
//! ```

mod clause;
mod compile;
mod content;
pub mod ddl;
mod descriptor;
mod error;
mod keyword;
mod model;
mod provider;
pub mod query;
mod registry;
mod row;
pub mod sql;
mod value;

pub use clause::{Clause, Operator};
pub use compile::{CompiledClause, compile, compile_all};
pub use content::{COUNT_COLUMN, ContentResolver, ContentStore};
pub use ddl::DdlOptions;
pub use descriptor::{
    Affinity, CountStrategy, DefaultValue, FieldDescriptor, ForeignKeyDescriptor, ModelDescriptor,
    ProviderBinding, ProviderKind, SemanticType,
};
pub use error::{
    CompileError, Feature, MappingError, QueryError, StorageError, UnsupportedOperation,
};
pub use keyword::{Collate, ConflictPolicy, Join, JoinKind, Limit, Order, OrderBy, order_by_sql};
pub use model::Model;
pub use provider::{CompiledJoin, SelectRequest, StorageProvider};
pub use query::{BuilderState, Count, Delete, Insert, Raw, ResultIter, Select, Update};
pub use registry::Registry;
pub use row::{Cursor, Row, Values};
pub use value::{FromValue, ToValue, Uri, Value};
