use std::marker::PhantomData;

use crate::clause::Clause;
use crate::error::QueryError;
use crate::model::Model;
use crate::provider::StorageProvider;

use super::select::compile_optional;
use super::{BuilderState, Lifecycle};

/// Count builder for model `T`.
///
/// The provider picks its counting method from its own binding; the
/// builder never retries with another one.
pub struct Count<'p, T, P: ?Sized = dyn StorageProvider> {
    provider: &'p P,
    clause: Option<Clause>,
    lifecycle: Lifecycle,
    _model: PhantomData<fn() -> T>,
}

impl<'p, T: Model, P: StorageProvider + ?Sized> Count<'p, T, P> {
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

    pub fn execute(&mut self) -> Result<u64, QueryError> {
        self.lifecycle.execute("count")?;
        let selection = compile_optional(self.clause.as_ref())?;
        Ok(self.provider.execute_count(T::TABLE_NAME, &selection)?)
    }
}
