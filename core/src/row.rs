//! Rows read from a provider and value sets written to it.
//!
//! A [`Row`] is addressed by column name, never by position, so mapping
//! code tolerates providers that return columns in query order rather
//! than declaration order. [`Values`] is the ordered column/value payload
//! used by inserts and updates.

use std::sync::Arc;

use crate::error::MappingError;
use crate::value::{FromValue, Value};

/// One result row with its column names.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a row. `values` must line up with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the raw cell for `column`.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::MissingColumn`] if the row has no such column.
    pub fn value(&self, column: &str) -> Result<&Value, MappingError> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|idx| self.values.get(idx))
            .ok_or_else(|| MappingError::MissingColumn(column.to_string()))
    }

    /// Reads `column` and coerces it to `T`.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, MappingError> {
        T::from_value(column, self.value(column)?)
    }
}

/// Ordered column/value pairs for insert and update statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Values {
    entries: Vec<(String, Value)>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column`, replacing an earlier value for the same column in place.
    pub fn put(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }

    /// Builds the row a provider would return after storing these values.
    ///
    /// Columns listed in `columns` but absent here read back as `NULL`,
    /// which is what a backend applies when an optional column is omitted.
    pub fn to_row(&self, columns: &[&str]) -> Row {
        let names: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
        let values = columns
            .iter()
            .map(|c| self.get(c).cloned().unwrap_or(Value::Null))
            .collect();
        Row::new(names, values)
    }
}

impl<C: Into<String>, V: Into<Value>> FromIterator<(C, V)> for Values {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (column, value) in iter {
            values.put(column, value);
        }
        values
    }
}

/// Buffered result rows handed back by a provider.
///
/// The provider has already released its statement when a cursor is
/// returned; iteration yields rows that share one column list.
#[derive(Debug)]
pub struct Cursor {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl Cursor {
    pub fn new(columns: Arc<[String]>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns,
            rows: rows.into_iter(),
        }
    }

    /// A cursor with no columns and no rows.
    pub fn empty() -> Self {
        Self::new(Arc::from(Vec::new()), Vec::new())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl Iterator for Cursor {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows
            .next()
            .map(|values| Row::new(Arc::clone(&self.columns), values))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}
