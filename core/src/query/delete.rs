use std::marker::PhantomData;

use crate::clause::Clause;
use crate::error::QueryError;
use crate::model::Model;
use crate::provider::StorageProvider;

use super::select::compile_optional;
use super::{BuilderState, Lifecycle};

/// Delete builder for model `T`. Without a filter every row is removed.
pub struct Delete<'p, T, P: ?Sized = dyn StorageProvider> {
    provider: &'p P,
    clause: Option<Clause>,
    lifecycle: Lifecycle,
    _model: PhantomData<fn() -> T>,
}

impl<'p, T: Model, P: StorageProvider + ?Sized> Delete<'p, T, P> {
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            clause: None,
            lifecycle: Lifecycle::default(),
            _model: PhantomData,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.lifecycle.state()
    }

    pub fn filter(mut self, clause: Clause) -> Self {
        self.clause = Some(clause);
        self.lifecycle.configure();
        self
    }

    /// Targets the row holding `model`'s primary key.
    pub fn model(self, model: &T) -> Self {
        self.filter(Clause::eq(T::PRIMARY_KEY, model.primary_key()))
    }

    pub fn execute(&mut self) -> Result<u64, QueryError> {
        self.lifecycle.execute("delete")?;
        let selection = compile_optional(self.clause.as_ref())?;
        Ok(self.provider.execute_delete(T::TABLE_NAME, &selection)?)
    }
}
