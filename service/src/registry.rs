//! Shared model registry
//!
//! Models are registered by their `unique_id`. References look their
//! resolved targets up here by id rather than holding direct cyclic
//! object references.

use std::sync::Arc;

use dashmap::DashMap;

use geocatalog_core::{CatalogError, Result};

use crate::model::Model;

/// Registry of live models, keyed by unique id
#[derive(Default)]
pub struct ModelRegistry {
    models: DashMap<String, Arc<Model>>,
}

impl ModelRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under its unique id
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] when a model with the
    /// same id is already registered.
    pub fn insert(&self, model: Arc<Model>) -> Result<()> {
        let id = model.unique_id().to_string();
        match self.models.entry(id) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                Err(CatalogError::DuplicateId(entry.key().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(model);
                Ok(())
            }
        }
    }

    /// Register a model, replacing any existing model of the same id
    pub fn insert_or_replace(&self, model: Arc<Model>) {
        self.models.insert(model.unique_id().to_string(), model);
    }

    /// Look a model up by id
    #[must_use]
    pub fn get(&self, unique_id: &str) -> Option<Arc<Model>> {
        self.models.get(unique_id).map(|entry| Arc::clone(&entry))
    }

    /// Destroy a model by removing it from the registry
    pub fn remove(&self, unique_id: &str) -> Option<Arc<Model>> {
        self.models.remove(unique_id).map(|(_, model)| model)
    }

    /// Number of registered models
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocatalog_core::{TraitKind, TraitDefinition, TraitSchema};

    fn model(id: &str) -> Arc<Model> {
        let schema = Arc::new(
            TraitSchema::new("test").with_trait(TraitDefinition::new("url", TraitKind::String)),
        );
        Arc::new(Model::new(id, schema))
    }

    #[test]
    fn test_insert_get_remove() {
        let registry = ModelRegistry::new();
        registry.insert(model("a")).unwrap();
        assert!(registry.get("a").is_some());

        let err = registry.insert(model("a")).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(_)));

        assert!(registry.remove("a").is_some());
        assert!(registry.get("a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_insert_or_replace() {
        let registry = ModelRegistry::new();
        registry.insert(model("a")).unwrap();
        registry.insert_or_replace(model("a"));
        assert_eq!(registry.len(), 1);
    }
}
