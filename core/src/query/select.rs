use std::marker::PhantomData;

use crate::clause::Clause;
use crate::compile::{CompiledClause, compile};
use crate::descriptor::ProviderKind;
use crate::error::{MappingError, QueryError};
use crate::keyword::{Join, Limit, OrderBy};
use crate::model::Model;
use crate::provider::{CompiledJoin, SelectRequest, StorageProvider};
use crate::row::Cursor;

use super::{BuilderState, Lifecycle, require_local};

/// Select builder for model `T`.
pub struct Select<'p, T, P: ?Sized = dyn StorageProvider> {
    provider: &'p P,
    clause: Option<Clause>,
    joins: Vec<Join>,
    group_by: Vec<String>,
    having: Option<Clause>,
    order_by: Vec<OrderBy>,
    limit: Option<Limit>,
    lifecycle: Lifecycle,
    _model: PhantomData<fn() -> T>,
}

impl<'p, T: Model, P: StorageProvider + ?Sized> Select<'p, T, P> {
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            clause: None,
            joins: Vec::new(),
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            lifecycle: Lifecycle::default(),
            _model: PhantomData,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.lifecycle.state()
    }

    /// Sets the `WHERE` condition.
    pub fn filter(mut self, clause: Clause) -> Self {
        self.clause = Some(clause);
        self.lifecycle.configure();
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self.lifecycle.configure();
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = columns.into_iter().map(Into::into).collect();
        self.lifecycle.configure();
        self
    }

    pub fn having(mut self, clause: Clause) -> Self {
        self.having = Some(clause);
        self.lifecycle.configure();
        self
    }

    /// Appends an ordering term.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self.lifecycle.configure();
        self
    }

    pub fn limit(mut self, limit: Limit) -> Self {
        self.limit = Some(limit);
        self.lifecycle.configure();
        self
    }

    /// Runs the select and returns a lazily mapped result sequence.
    ///
    /// # Errors
    ///
    /// Fails with [`QueryError::Unsupported`] before touching the provider
    /// when a content-style provider is asked for a join, grouping,
    /// `HAVING` or a limit.
    pub fn query(&mut self) -> Result<ResultIter<T>, QueryError> {
        self.lifecycle.execute("select")?;
        let request = self.request()?;
        require_local(self.provider, T::TABLE_NAME, request.local_only_feature())?;
        let cursor = self.provider.execute_select(&request)?;
        Ok(ResultIter::new(cursor))
    }

    /// Runs the select and maps every row.
    pub fn query_all(&mut self) -> Result<Vec<T>, QueryError> {
        let rows = self.query()?;
        rows.map(|row| row.map_err(QueryError::from)).collect()
    }

    /// Runs the select and maps the first row, if any.
    ///
    /// Local providers are asked for a single row unless a limit was set.
    pub fn query_single(&mut self) -> Result<Option<T>, QueryError> {
        if self.limit.is_none() && self.provider.kind() == ProviderKind::Local {
            self.limit = Some(Limit::new(1));
        }
        let mut rows = self.query()?;
        rows.next().transpose().map_err(QueryError::from)
    }

    fn request(&self) -> Result<SelectRequest, QueryError> {
        let joins = self
            .joins
            .iter()
            .map(|join| {
                Ok(CompiledJoin {
                    kind: join.kind,
                    table: join.table.clone(),
                    on: compile_optional(join.on.as_ref())?,
                })
            })
            .collect::<Result<Vec<_>, QueryError>>()?;

        Ok(SelectRequest {
            table: T::TABLE_NAME.to_string(),
            columns: T::COLUMNS.iter().map(|c| c.to_string()).collect(),
            selection: compile_optional(self.clause.as_ref())?,
            joins,
            group_by: self.group_by.clone(),
            having: compile_optional(self.having.as_ref())?,
            order_by: self.order_by.clone(),
            limit: self.limit,
        })
    }
}

pub(crate) fn compile_optional(clause: Option<&Clause>) -> Result<CompiledClause, QueryError> {
    match clause {
        Some(clause) => Ok(compile(clause)?),
        None => Ok(CompiledClause::empty()),
    }
}

/// Rows of a select, mapped onto `T` one at a time.
#[derive(Debug)]
pub struct ResultIter<T> {
    cursor: Cursor,
    _model: PhantomData<fn() -> T>,
}

impl<T: Model> ResultIter<T> {
    pub fn new(cursor: Cursor) -> Self {
        Self {
            cursor,
            _model: PhantomData,
        }
    }

    /// Rows not yet mapped.
    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }
}

impl<T: Model> Iterator for ResultIter<T> {
    type Item = Result<T, MappingError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next().map(|row| T::from_row(&row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use crate::query::testing::{Call, Note, Recorder, note_row};
    use crate::value::Value;

    #[test]
    fn test_query_maps_rows_lazily() {
        let provider = Recorder::new(ProviderKind::Local).with_rows(vec![
            note_row(1, "first"),
            vec![Value::Integer(2), Value::Null, Value::Null],
        ]);
        let mut select = Select::<Note>::new(&provider);
        let mut rows = select.query().unwrap();

        assert_eq!(rows.remaining(), 2);
        let first = rows.next().unwrap().unwrap();
        assert_eq!(first.title, "first");
        assert!(rows.next().unwrap().is_err());
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_request_carries_compiled_parts() {
        let provider = Recorder::new(ProviderKind::Local);
        Select::<Note>::new(&provider)
            .filter(Clause::and([
                Clause::eq("title", "x"),
                Clause::or([Clause::is_null("body"), Clause::like("body", "%x%")]),
            ]))
            .order_by(OrderBy::desc("_id"))
            .order_by(OrderBy::asc("title"))
            .query_all()
            .unwrap();

        let Call::Select(request) = &provider.calls()[0] else {
            panic!("expected a select");
        };
        assert_eq!(request.table, "notes");
        assert_eq!(request.columns, vec!["_id", "title", "body"]);
        assert_eq!(
            request.selection.sql(),
            "title = ? AND (body IS NULL OR body LIKE ?)"
        );
        assert_eq!(request.order_by.len(), 2);
        assert_eq!(request.limit, None);
    }

    #[test]
    fn test_query_single_limits_local_providers() {
        let provider = Recorder::new(ProviderKind::Local).with_rows(vec![note_row(5, "only")]);
        let note = Select::<Note>::new(&provider).query_single().unwrap().unwrap();
        assert_eq!(note.id, 5);
        let Call::Select(request) = &provider.calls()[0] else {
            panic!("expected a select");
        };
        assert_eq!(request.limit, Some(Limit::new(1)));
    }

    #[test]
    fn test_query_single_on_content_has_no_limit() {
        let provider = Recorder::new(ProviderKind::Content);
        let note = Select::<Note>::new(&provider).query_single().unwrap();
        assert!(note.is_none());
        let Call::Select(request) = &provider.calls()[0] else {
            panic!("expected a select");
        };
        assert_eq!(request.limit, None);
    }

    #[test]
    fn test_compile_error_stops_before_provider() {
        let provider = Recorder::new(ProviderKind::Local);
        let err = Select::<Note>::new(&provider)
            .filter(Clause::in_list("_id", Vec::<i64>::new()))
            .query_all()
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::Compile(CompileError::EmptyInList(ref column)) if column == "_id"
        ));
        assert!(provider.calls().is_empty());
    }
}
