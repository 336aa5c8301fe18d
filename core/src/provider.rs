//! The storage-provider interface consumed by the query builder facade.
//!
//! Providers receive already-compiled clauses and never see a
//! [`Clause`](crate::Clause) tree. Every method runs one storage call and
//! releases whatever it opened before returning.

use crate::compile::CompiledClause;
use crate::descriptor::ProviderKind;
use crate::error::{Feature, StorageError};
use crate::keyword::{ConflictPolicy, JoinKind, Limit, OrderBy};
use crate::row::{Cursor, Values};
use crate::value::Value;

/// A join with its `ON` condition already compiled.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledJoin {
    pub kind: JoinKind,
    pub table: String,
    /// Empty for cross and natural joins.
    pub on: CompiledClause,
}

/// Everything a provider needs to run one select.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectRequest {
    pub table: String,
    /// Projected columns; empty selects every column.
    pub columns: Vec<String>,
    pub selection: CompiledClause,
    pub joins: Vec<CompiledJoin>,
    pub group_by: Vec<String>,
    pub having: CompiledClause,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<Limit>,
}

impl SelectRequest {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// The first feature, in clause order, that only local providers support.
    pub fn local_only_feature(&self) -> Option<Feature> {
        if !self.joins.is_empty() {
            Some(Feature::Join)
        } else if !self.group_by.is_empty() {
            Some(Feature::GroupBy)
        } else if !self.having.is_empty() {
            Some(Feature::Having)
        } else if self.limit.is_some() {
            Some(Feature::Limit)
        } else {
            None
        }
    }
}

/// A storage backend able to execute compiled requests.
///
/// Implementations pass their own failures through as [`StorageError`];
/// callers never retry.
pub trait StorageProvider {
    /// Backend family, used for capability checks before any I/O.
    fn kind(&self) -> ProviderKind;

    /// Runs a select and returns the buffered rows.
    fn execute_select(&self, request: &SelectRequest) -> Result<Cursor, StorageError>;

    /// Inserts `rows` and returns how many were stored.
    fn execute_insert(
        &self,
        table: &str,
        rows: &[Values],
        policy: ConflictPolicy,
    ) -> Result<u64, StorageError>;

    /// Applies `values` to matching rows and returns how many changed.
    fn execute_update(
        &self,
        table: &str,
        values: &Values,
        selection: &CompiledClause,
    ) -> Result<u64, StorageError>;

    /// Deletes matching rows and returns how many were removed.
    fn execute_delete(&self, table: &str, selection: &CompiledClause) -> Result<u64, StorageError>;

    /// Counts matching rows.
    fn execute_count(&self, table: &str, selection: &CompiledClause) -> Result<u64, StorageError>;

    /// Runs a raw SQL query.
    fn execute_raw(&self, sql: &str, args: &[Value]) -> Result<Cursor, StorageError>;
}

impl<P: StorageProvider + ?Sized> StorageProvider for &P {
    fn kind(&self) -> ProviderKind {
        (**self).kind()
    }

    fn execute_select(&self, request: &SelectRequest) -> Result<Cursor, StorageError> {
        (**self).execute_select(request)
    }

    fn execute_insert(
        &self,
        table: &str,
        rows: &[Values],
        policy: ConflictPolicy,
    ) -> Result<u64, StorageError> {
        (**self).execute_insert(table, rows, policy)
    }

    fn execute_update(
        &self,
        table: &str,
        values: &Values,
        selection: &CompiledClause,
    ) -> Result<u64, StorageError> {
        (**self).execute_update(table, values, selection)
    }

    fn execute_delete(&self, table: &str, selection: &CompiledClause) -> Result<u64, StorageError> {
        (**self).execute_delete(table, selection)
    }

    fn execute_count(&self, table: &str, selection: &CompiledClause) -> Result<u64, StorageError> {
        (**self).execute_count(table, selection)
    }

    fn execute_raw(&self, sql: &str, args: &[Value]) -> Result<Cursor, StorageError> {
        (**self).execute_raw(sql, args)
    }
}
