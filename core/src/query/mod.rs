//! Query builder facade.
//!
//! Each builder targets one [`Model`](crate::Model) and one
//! [`StorageProvider`]. Configuration methods may be called in any order
//! and any number of times; the last write wins for single-valued
//! settings, and ordering terms and joins accumulate. A builder runs
//! once: calling an execution method again returns
//! [`QueryError::AlreadyExecuted`].
//!
//! Capability checks for content-style providers happen before any call
//! into the provider.
//!
//! # Example
//!
//! ```ignore
//! let adults = Select::<User>::new(&db)
//!     .filter(Clause::ge("age", 18))
//!     .order_by(OrderBy::asc("username"))
//!     .query_all()?;
//! ```

mod count;
mod delete;
mod insert;
mod raw;
mod select;
mod update;

pub use count::Count;
pub use delete::Delete;
pub use insert::Insert;
pub use raw::Raw;
pub use select::{ResultIter, Select};
pub use update::Update;

use tracing::warn;

use crate::descriptor::ProviderKind;
use crate::error::{Feature, QueryError, UnsupportedOperation};
use crate::provider::StorageProvider;

/// Where a builder is in its single-use lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BuilderState {
    /// Created, nothing set yet.
    #[default]
    Unconfigured,
    /// At least one setting applied.
    Configured,
    /// An execution method has been called. Terminal.
    Executed,
}

#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    state: BuilderState,
}

impl Lifecycle {
    pub(crate) fn state(&self) -> BuilderState {
        self.state
    }

    pub(crate) fn configure(&mut self) {
        if self.state == BuilderState::Unconfigured {
            self.state = BuilderState::Configured;
        }
    }

    /// Marks the builder executed, failing if it already was.
    pub(crate) fn execute(&mut self, builder: &'static str) -> Result<(), QueryError> {
        if self.state == BuilderState::Executed {
            return Err(QueryError::AlreadyExecuted(builder));
        }
        self.state = BuilderState::Executed;
        Ok(())
    }
}

/// Rejects `feature` when `provider` is content-style.
pub(crate) fn require_local<P: StorageProvider + ?Sized>(
    provider: &P,
    table: &str,
    feature: Option<Feature>,
) -> Result<(), QueryError> {
    match feature {
        Some(feature) if provider.kind() == ProviderKind::Content => {
            warn!(table, %feature, "rejecting query on content provider");
            Err(UnsupportedOperation::new(feature).into())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A provider stub that records calls and serves canned rows.

    use std::cell::RefCell;
    use std::sync::Arc;

    use crate::compile::CompiledClause;
    use crate::descriptor::ProviderKind;
    use crate::error::{MappingError, StorageError};
    use crate::keyword::ConflictPolicy;
    use crate::model::Model;
    use crate::provider::{SelectRequest, StorageProvider};
    use crate::row::{Cursor, Row, Values};
    use crate::value::Value;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Select(SelectRequest),
        Insert(String, Vec<Values>, ConflictPolicy),
        Update(String, Values, CompiledClause),
        Delete(String, CompiledClause),
        Count(String, CompiledClause),
        Raw(String, Vec<Value>),
    }

    pub struct Recorder {
        pub kind: ProviderKind,
        pub calls: RefCell<Vec<Call>>,
        pub rows: Vec<Vec<Value>>,
    }

    impl Recorder {
        pub fn new(kind: ProviderKind) -> Self {
            Self {
                kind,
                calls: RefCell::new(Vec::new()),
                rows: Vec::new(),
            }
        }

        pub fn with_rows(mut self, rows: Vec<Vec<Value>>) -> Self {
            self.rows = rows;
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn cursor(&self) -> Cursor {
            let columns: Arc<[String]> = Note::COLUMNS.iter().map(|c| c.to_string()).collect();
            Cursor::new(columns, self.rows.clone())
        }
    }

    impl StorageProvider for Recorder {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        fn execute_select(&self, request: &SelectRequest) -> Result<Cursor, StorageError> {
            self.calls.borrow_mut().push(Call::Select(request.clone()));
            Ok(self.cursor())
        }

        fn execute_insert(
            &self,
            table: &str,
            rows: &[Values],
            policy: ConflictPolicy,
        ) -> Result<u64, StorageError> {
            self.calls
                .borrow_mut()
                .push(Call::Insert(table.to_string(), rows.to_vec(), policy));
            Ok(rows.len() as u64)
        }

        fn execute_update(
            &self,
            table: &str,
            values: &Values,
            selection: &CompiledClause,
        ) -> Result<u64, StorageError> {
            self.calls.borrow_mut().push(Call::Update(
                table.to_string(),
                values.clone(),
                selection.clone(),
            ));
            Ok(1)
        }

        fn execute_delete(
            &self,
            table: &str,
            selection: &CompiledClause,
        ) -> Result<u64, StorageError> {
            self.calls
                .borrow_mut()
                .push(Call::Delete(table.to_string(), selection.clone()));
            Ok(2)
        }

        fn execute_count(
            &self,
            table: &str,
            selection: &CompiledClause,
        ) -> Result<u64, StorageError> {
            self.calls
                .borrow_mut()
                .push(Call::Count(table.to_string(), selection.clone()));
            Ok(self.rows.len() as u64)
        }

        fn execute_raw(&self, sql: &str, args: &[Value]) -> Result<Cursor, StorageError> {
            self.calls
                .borrow_mut()
                .push(Call::Raw(sql.to_string(), args.to_vec()));
            Ok(self.cursor())
        }
    }

    /// Hand-written model in the shape the code generator emits.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Note {
        pub id: i64,
        pub title: String,
        pub body: Option<String>,
    }

    impl Model for Note {
        const NAME: &'static str = "Note";
        const TABLE_NAME: &'static str = "notes";
        const COLUMNS: &'static [&'static str] = &["_id", "title", "body"];
        const PRIMARY_KEY: &'static str = "_id";
        const PROVIDER: &'static str = "Test";
        const PROVIDER_KIND: ProviderKind = ProviderKind::Local;
        const CREATE_TABLE: &'static str =
            "CREATE TABLE notes (_id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT NOT NULL, body TEXT)";
        const CREATE_INDEXES: &'static [&'static str] = &[];

        fn from_row(row: &Row) -> Result<Self, MappingError> {
            Ok(Self {
                id: row.get("_id")?,
                title: row.get("title")?,
                body: row.get("body")?,
            })
        }

        fn to_values(&self) -> Values {
            let mut values = Values::new();
            if self.id != 0 {
                values.put("_id", self.id);
            }
            values.put("title", self.title.clone());
            if let Some(body) = &self.body {
                values.put("body", body.clone());
            }
            values
        }

        fn primary_key(&self) -> Value {
            Value::from(self.id)
        }

        fn set_primary_key(&mut self, value: &Value) -> Result<(), MappingError> {
            self.id = crate::value::FromValue::from_value("_id", value)?;
            Ok(())
        }
    }

    pub fn note_row(id: i64, title: &str) -> Vec<Value> {
        vec![Value::Integer(id), Value::from(title), Value::Null]
    }
}
