//! Conversion between model values and SQLite cells.

use std::sync::Arc;

use model_query_core::{Cursor, Value};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Params, Statement, ToSql, params_from_iter};

use crate::error::{Result, SqliteError};

/// Binds a [`Value`] without copying it.
pub(crate) struct Param<'a>(pub &'a Value);

impl ToSql for Param<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self.0 {
            Value::Null => ValueRef::Null,
            Value::Integer(v) => ValueRef::Integer(*v),
            Value::Real(v) => ValueRef::Real(*v),
            Value::Text(v) => ValueRef::Text(v.as_bytes()),
            Value::Blob(v) => ValueRef::Blob(v),
        };
        Ok(ToSqlOutput::Borrowed(value))
    }
}

/// Positional parameters for `args`, in order.
pub(crate) fn params(args: &[Value]) -> impl Params + '_ {
    params_from_iter(args.iter().map(Param))
}

pub(crate) fn from_value_ref(value: ValueRef<'_>) -> Result<Value> {
    Ok(match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(v) => Value::Integer(v),
        ValueRef::Real(v) => Value::Real(v),
        ValueRef::Text(bytes) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| SqliteError::ConversionError(format!("text is not UTF-8: {e}")))?;
            Value::Text(text.to_string())
        }
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    })
}

/// Runs `stmt` and buffers every row, so the statement is done with
/// before the cursor is handed out.
pub(crate) fn read_cursor(stmt: &mut Statement<'_>, args: &[Value]) -> Result<Cursor> {
    let columns: Arc<[String]> = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect();
    let width = columns.len();

    let mut rows = stmt.query(params(args))?;
    let mut buffered = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|i| from_value_ref(row.get_ref(i)?))
            .collect::<Result<Vec<_>>>()?;
        buffered.push(values);
    }
    Ok(Cursor::new(columns, buffered))
}
