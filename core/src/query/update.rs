use std::marker::PhantomData;

use crate::clause::Clause;
use crate::error::QueryError;
use crate::model::Model;
use crate::provider::StorageProvider;
use crate::row::Values;
use crate::value::Value;

use super::select::compile_optional;
use super::{BuilderState, Lifecycle};

/// Update builder for model `T`.
pub struct Update<'p, T, P: ?Sized = dyn StorageProvider> {
    provider: &'p P,
    values: Values,
    clause: Option<Clause>,
    lifecycle: Lifecycle,
    _model: PhantomData<fn() -> T>,
}

impl<'p, T: Model, P: StorageProvider + ?Sized> Update<'p, T, P> {
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            values: Values::new(),
            clause: None,
            lifecycle: Lifecycle::default(),
            _model: PhantomData,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.lifecycle.state()
    }

    /// Replaces the column values to write.
    pub fn values(mut self, values: Values) -> Self {
        self.values = values;
        self.lifecycle.configure();
        self
    }

    /// Sets one column value.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.put(column, value);
        self.lifecycle.configure();
        self
    }

    pub fn filter(mut self, clause: Clause) -> Self {
        self.clause = Some(clause);
        self.lifecycle.configure();
        self
    }

    /// Writes the columns [`Model::to_values`] emits for `model`, except
    /// its key, matching on the key. Empty optional columns are not in
    /// that payload, so their stored values are left unchanged; clear
    /// them with [`set`](Self::set) and `Value::Null`.
    pub fn model(mut self, model: &T) -> Self {
        self.values = model
            .to_values()
            .into_entries()
            .into_iter()
            .filter(|(column, _)| column != T::PRIMARY_KEY)
            .collect();
        self.clause = Some(Clause::eq(T::PRIMARY_KEY, model.primary_key()));
        self.lifecycle.configure();
        self
    }

    /// Applies the update and returns the number of changed rows.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::EmptyUpdate`] when no values were set.
    pub fn execute(&mut self) -> Result<u64, QueryError> {
        self.lifecycle.execute("update")?;
        if self.values.is_empty() {
            return Err(QueryError::EmptyUpdate(T::TABLE_NAME.to_string()));
        }
        let selection = compile_optional(self.clause.as_ref())?;
        Ok(self
            .provider
            .execute_update(T::TABLE_NAME, &self.values, &selection)?)
    }
}
