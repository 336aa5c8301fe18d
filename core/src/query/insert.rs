use std::marker::PhantomData;

use tracing::debug;

use crate::error::QueryError;
use crate::keyword::ConflictPolicy;
use crate::model::Model;
use crate::provider::StorageProvider;
use crate::row::Values;

use super::{BuilderState, Lifecycle};

/// Insert builder for model `T`.
///
/// Rows are written in one provider call with the configured conflict
/// policy, `IGNORE` unless changed.
pub struct Insert<'p, T, P: ?Sized = dyn StorageProvider> {
    provider: &'p P,
    rows: Vec<Values>,
    policy: ConflictPolicy,
    lifecycle: Lifecycle,
    _model: PhantomData<fn() -> T>,
}

impl<'p, T: Model, P: StorageProvider + ?Sized> Insert<'p, T, P> {
    pub fn new(provider: &'p P) -> Self {
        Self {
            provider,
            rows: Vec::new(),
            policy: ConflictPolicy::default(),
            lifecycle: Lifecycle::default(),
            _model: PhantomData,
        }
    }

    pub fn state(&self) -> BuilderState {
        self.lifecycle.state()
    }

    pub fn model(mut self, model: &T) -> Self {
        self.rows.push(model.to_values());
        self.lifecycle.configure();
        self
    }

    pub fn models<'m>(mut self, models: impl IntoIterator<Item = &'m T>) -> Self
    where
        T: 'm,
    {
        self.rows.extend(models.into_iter().map(Model::to_values));
        self.lifecycle.configure();
        self
    }

    /// Adds a row given as raw column values.
    pub fn values(mut self, values: Values) -> Self {
        self.rows.push(values);
        self.lifecycle.configure();
        self
    }

    pub fn conflict(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self.lifecycle.configure();
        self
    }

    /// Inserts the collected rows and returns how many were stored.
    pub fn execute(&mut self) -> Result<u64, QueryError> {
        self.lifecycle.execute("insert")?;
        if self.rows.is_empty() {
            return Ok(0);
        }
        debug!(table = T::TABLE_NAME, rows = self.rows.len(), "insert");
        Ok(self
            .provider
            .execute_insert(T::TABLE_NAME, &self.rows, self.policy)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ProviderKind;
    use crate::query::testing::{Call, Note, Recorder};
    use crate::value::Value;

    #[test]
    fn test_insert_omits_unset_key_and_empty_optionals() {
        let provider = Recorder::new(ProviderKind::Local);
        let notes = [
            Note {
                id: 0,
                title: "draft".into(),
                body: None,
            },
            Note {
                id: 9,
                title: "kept".into(),
                body: Some("text".into()),
            },
        ];
        let inserted = Insert::<Note>::new(&provider)
            .models(&notes)
            .conflict(ConflictPolicy::Replace)
            .execute()
            .unwrap();
        assert_eq!(inserted, 2);

        let Call::Insert(table, rows, policy) = &provider.calls()[0] else {
            panic!("expected an insert");
        };
        assert_eq!(table, "notes");
        assert_eq!(*policy, ConflictPolicy::Replace);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["title"]);
        assert_eq!(
            rows[1].columns().collect::<Vec<_>>(),
            vec!["_id", "title", "body"]
        );
        assert_eq!(rows[1].get("_id"), Some(&Value::Integer(9)));
    }

    #[test]
    fn test_default_policy_is_ignore() {
        let provider = Recorder::new(ProviderKind::Content);
        Insert::<Note>::new(&provider)
            .values([("title", "raw")].into_iter().collect())
            .execute()
            .unwrap();
        let Call::Insert(_, _, policy) = &provider.calls()[0] else {
            panic!("expected an insert");
        };
        assert_eq!(*policy, ConflictPolicy::Ignore);
    }

    #[test]
    fn test_empty_insert_skips_provider() {
        let provider = Recorder::new(ProviderKind::Local);
        let mut insert = Insert::<Note>::new(&provider);
        assert_eq!(insert.execute().unwrap(), 0);
        assert!(provider.calls().is_empty());
        assert!(insert.execute().is_err());
    }
}
