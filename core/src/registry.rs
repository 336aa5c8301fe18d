//! Explicit model registry.
//!
//! Built once by the metadata extractor and passed by reference to every
//! component that resolves a model to its table or provider. Keys are
//! ordered so every traversal is deterministic.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::{ModelDescriptor, ProviderBinding};

/// Model and provider lookup tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    providers: BTreeMap<String, ProviderBinding>,
    models: BTreeMap<String, ModelDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider, returning the binding it replaced.
    pub fn insert_provider(&mut self, binding: ProviderBinding) -> Option<ProviderBinding> {
        self.providers.insert(binding.name.clone(), binding)
    }

    /// Registers a model and its provider binding, returning the
    /// descriptor it replaced.
    pub fn insert_model(&mut self, model: ModelDescriptor) -> Option<ModelDescriptor> {
        self.providers
            .entry(model.provider.name.clone())
            .or_insert_with(|| model.provider.clone());
        self.models.insert(model.name.clone(), model)
    }

    pub fn model(&self, name: &str) -> Option<&ModelDescriptor> {
        self.models.get(name)
    }

    /// Finds the model mapped to `table` within `provider`.
    pub fn model_for_table(&self, provider: &str, table: &str) -> Option<&ModelDescriptor> {
        self.models
            .values()
            .find(|m| m.provider.name == provider && m.table_name == table)
    }

    /// All models, ordered by name.
    pub fn models(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.values()
    }

    /// Models bound to `provider`, ordered by name.
    pub fn models_for_provider(&self, provider: &str) -> Vec<&ModelDescriptor> {
        self.models
            .values()
            .filter(|m| m.provider.name == provider)
            .collect()
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderBinding> {
        self.providers.get(name)
    }

    /// The provider a model is bound to.
    pub fn provider_for_model(&self, model: &str) -> Option<&ProviderBinding> {
        self.models.get(model).map(|m| &m.provider)
    }

    /// All providers, ordered by name.
    pub fn providers(&self) -> impl Iterator<Item = &ProviderBinding> {
        self.providers.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
