//! Storage provider for content-style row stores.
//!
//! A content store addresses each table by a resource locator of the form
//! `content://<authority>/<table>` (first letter of the table lower-cased)
//! and only understands projection, selection and ordering. Joins,
//! grouping, `HAVING`, limits and raw SQL are rejected before the resolver
//! is called.

use tracing::debug;

use crate::compile::CompiledClause;
use crate::descriptor::{CountStrategy, ProviderBinding, ProviderKind};
use crate::error::{Feature, StorageError, UnsupportedOperation};
use crate::keyword::{ConflictPolicy, order_by_sql};
use crate::provider::{SelectRequest, StorageProvider};
use crate::row::{Cursor, Values};
use crate::value::Value;

/// Column exposed by non-SQL content stores for row counts.
pub const COUNT_COLUMN: &str = "_count";

/// The transport behind a [`ContentStore`].
pub trait ContentResolver {
    fn query(
        &self,
        uri: &str,
        projection: &[String],
        selection: Option<&str>,
        args: &[Value],
        sort_order: Option<&str>,
    ) -> Result<Cursor, StorageError>;

    fn bulk_insert(&self, uri: &str, rows: &[Values]) -> Result<u64, StorageError>;

    fn update(
        &self,
        uri: &str,
        values: &Values,
        selection: Option<&str>,
        args: &[Value],
    ) -> Result<u64, StorageError>;

    fn delete(&self, uri: &str, selection: Option<&str>, args: &[Value])
    -> Result<u64, StorageError>;
}

/// Adapts a [`ContentResolver`] to the [`StorageProvider`] interface.
#[derive(Debug)]
pub struct ContentStore<R> {
    resolver: R,
    authority: String,
    count: CountStrategy,
}

impl<R: ContentResolver> ContentStore<R> {
    pub fn new(resolver: R, authority: impl Into<String>) -> Self {
        Self {
            resolver,
            authority: authority.into(),
            count: CountStrategy::Projection,
        }
    }

    /// Builds a store from a content provider binding.
    ///
    /// Returns `None` for local bindings or bindings without an authority.
    pub fn from_binding(resolver: R, binding: &ProviderBinding) -> Option<Self> {
        if binding.kind != ProviderKind::Content {
            return None;
        }
        let authority = binding.authority.clone()?;
        Some(Self {
            resolver,
            authority,
            count: binding.count,
        })
    }

    pub fn with_count_strategy(mut self, count: CountStrategy) -> Self {
        self.count = count;
        self
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn into_resolver(self) -> R {
        self.resolver
    }

    /// Resource locator for `table`.
    pub fn uri(&self, table: &str) -> String {
        let mut chars = table.chars();
        let path: String = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("content://{}/{path}", self.authority)
    }
}

fn selection_parts(selection: &CompiledClause) -> (Option<&str>, &[Value]) {
    if selection.is_empty() {
        (None, &[])
    } else {
        (Some(selection.sql()), selection.args())
    }
}

fn reject(feature: Feature) -> StorageError {
    StorageError::from(UnsupportedOperation::new(feature))
}

impl<R: ContentResolver> StorageProvider for ContentStore<R> {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Content
    }

    fn execute_select(&self, request: &SelectRequest) -> Result<Cursor, StorageError> {
        if let Some(feature) = request.local_only_feature() {
            return Err(reject(feature));
        }
        let uri = self.uri(&request.table);
        let (selection, args) = selection_parts(&request.selection);
        let sort = order_by_sql(&request.order_by);
        debug!(uri = %uri, selection = ?selection, "content query");
        self.resolver
            .query(&uri, &request.columns, selection, args, sort.as_deref())
    }

    /// Conflict policies are not expressible here; the resolver decides.
    fn execute_insert(
        &self,
        table: &str,
        rows: &[Values],
        _policy: ConflictPolicy,
    ) -> Result<u64, StorageError> {
        let uri = self.uri(table);
        debug!(uri = %uri, rows = rows.len(), "content bulk insert");
        self.resolver.bulk_insert(&uri, rows)
    }

    fn execute_update(
        &self,
        table: &str,
        values: &Values,
        selection: &CompiledClause,
    ) -> Result<u64, StorageError> {
        let uri = self.uri(table);
        let (selection, args) = selection_parts(selection);
        debug!(uri = %uri, selection = ?selection, "content update");
        self.resolver.update(&uri, values, selection, args)
    }

    fn execute_delete(&self, table: &str, selection: &CompiledClause) -> Result<u64, StorageError> {
        let uri = self.uri(table);
        let (selection, args) = selection_parts(selection);
        debug!(uri = %uri, selection = ?selection, "content delete");
        self.resolver.delete(&uri, selection, args)
    }

    fn execute_count(&self, table: &str, selection: &CompiledClause) -> Result<u64, StorageError> {
        let projection = match self.count {
            CountStrategy::Projection => "COUNT(*)",
            CountStrategy::CountColumn => COUNT_COLUMN,
        };
        let uri = self.uri(table);
        let (selection, args) = selection_parts(selection);
        debug!(uri = %uri, projection, "content count");
        let mut cursor =
            self.resolver
                .query(&uri, &[projection.to_string()], selection, args, None)?;
        let row = cursor
            .next()
            .ok_or_else(|| StorageError::msg(format!("count on {uri} returned no rows")))?;
        match row.values().first() {
            Some(Value::Integer(n)) => u64::try_from(*n)
                .map_err(|_| StorageError::msg(format!("count on {uri} returned {n}"))),
            other => Err(StorageError::msg(format!(
                "count on {uri} returned a {} value",
                other.map_or("missing", Value::type_name)
            ))),
        }
    }

    fn execute_raw(&self, _sql: &str, _args: &[Value]) -> Result<Cursor, StorageError> {
        Err(reject(Feature::RawQuery))
    }
}
