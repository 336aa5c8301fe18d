use crate::error::{Feature, QueryError};
use crate::model::Model;
use crate::provider::StorageProvider;
use crate::row::Cursor;
use crate::value::Value;

use super::select::ResultIter;
use super::{BuilderState, Lifecycle, require_local};

/// Raw SQL query. Only local providers accept these.
pub struct Raw<'p, P: ?Sized = dyn StorageProvider> {
    provider: &'p P,
    sql: String,
    args: Vec<Value>,
    lifecycle: Lifecycle,
}

impl<'p, P: StorageProvider + ?Sized> Raw<'p, P> {
    pub fn new(provider: &'p P, sql: impl Into<String>) -> Self {
        let mut lifecycle = Lifecycle::default();
        lifecycle.configure();
        Self {
            provider,
            sql: sql.into(),
            args: Vec::new(),
            lifecycle,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.lifecycle.state()
    }

    /// Binds arguments for the query's placeholders, in order.
    pub fn args<V: Into<Value>>(mut self, args: impl IntoIterator<Item = V>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Runs the query and returns the unmapped rows.
    pub fn rows(&mut self) -> Result<Cursor, QueryError> {
        self.lifecycle.execute("raw")?;
        require_local(self.provider, "<raw>", Some(Feature::RawQuery))?;
        Ok(self.provider.execute_raw(&self.sql, &self.args)?)
    }

    /// Runs the query and maps each row onto `T`.
    pub fn query<T: Model>(&mut self) -> Result<ResultIter<T>, QueryError> {
        Ok(ResultIter::new(self.rows()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ProviderKind;
    use crate::query::testing::{Call, Note, Recorder, note_row};

    #[test]
    fn test_raw_passes_sql_and_args() {
        let provider = Recorder::new(ProviderKind::Local).with_rows(vec![note_row(1, "x")]);
        let notes: Vec<Note> = Raw::new(&provider, "SELECT * FROM notes WHERE title = ?")
            .args(["x"])
            .query::<Note>()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(
            provider.calls()[0],
            Call::Raw(
                "SELECT * FROM notes WHERE title = ?".into(),
                vec![Value::from("x")]
            )
        );
    }
}
