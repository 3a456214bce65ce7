//! Catalog models and the stratified resolution engine
//!
//! A [`Model`] is an entity with a stable `unique_id`, a type
//! discriminator, and an ordered mapping of stratum name → [`Stratum`].
//! Resolved trait values are a pure function of the current strata
//! contents and the [`StratumOrder`] passed into resolution: the
//! highest-priority stratum defining a trait wins, and list traits
//! concatenate across strata in ascending priority unless a stratum
//! replaces the accumulation.
//!
//! Recomputation is pull-based: every mutation goes through the
//! [`Model::update`] action boundary, which bumps a revision counter;
//! cached resolved values are tagged with the revision and the order
//! fingerprint they were computed under and lazily recomputed once
//! either moves on.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value as JsonValue;

use geocatalog_core::prelude::*;

struct CacheEntry {
    revision: u64,
    order: u64,
    value: Option<TraitValue>,
}

/// A catalog model: stable identity plus layered trait values
pub struct Model {
    unique_id: String,
    type_name: String,
    schema: Arc<TraitSchema>,
    strata: RwLock<IndexMap<String, Stratum>>,
    revision: AtomicU64,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl Model {
    /// Create a model with no strata
    #[must_use]
    pub fn new(unique_id: impl Into<String>, schema: Arc<TraitSchema>) -> Self {
        Self {
            unique_id: unique_id.into(),
            type_name: schema.type_name.clone(),
            schema,
            strata: RwLock::new(IndexMap::new()),
            revision: AtomicU64::new(0),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Stable identity, assigned at creation
    #[must_use]
    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// Type discriminator selecting schema and behavior
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The schema this model conforms to
    #[must_use]
    pub fn schema(&self) -> &Arc<TraitSchema> {
        &self.schema
    }

    /// Current mutation revision; bumped by every [`Model::update`]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Apply a batch of mutations atomically
    ///
    /// The closure runs under the strata write lock and the revision
    /// is bumped once afterwards, so readers never observe a
    /// partially-written stratum.
    pub fn update<R>(&self, f: impl FnOnce(&mut StrataMut<'_>) -> R) -> R {
        let mut strata = self.strata.write();
        let mut guard = StrataMut {
            schema: &self.schema,
            strata: &mut strata,
        };
        let result = f(&mut guard);
        self.revision.fetch_add(1, Ordering::AcqRel);
        result
    }

    /// Set one trait at one stratum
    ///
    /// # Errors
    ///
    /// Fails for undeclared trait names or kind mismatches.
    pub fn set_trait(
        &self,
        stratum_name: &str,
        trait_name: &str,
        value: impl Into<TraitValue>,
    ) -> Result<()> {
        self.update(|strata| strata.set_trait(stratum_name, trait_name, value))
    }

    /// Install a stratum, replacing any prior stratum of the same name
    pub fn install_stratum(&self, name: impl Into<String>, stratum: Stratum) {
        self.update(|strata| strata.install_stratum(name, stratum));
    }

    /// Remove a stratum entirely
    pub fn remove_stratum(&self, name: &str) -> Option<Stratum> {
        self.update(|strata| strata.remove_stratum(name))
    }

    /// Whether a stratum of the given name is installed
    #[must_use]
    pub fn has_stratum(&self, name: &str) -> bool {
        self.strata.read().contains_key(name)
    }

    /// Clone of one installed stratum
    #[must_use]
    pub fn stratum(&self, name: &str) -> Option<Stratum> {
        self.strata.read().get(name).cloned()
    }

    /// Resolve a trait against the given stratum order
    ///
    /// Scans strata from highest to lowest priority and returns the
    /// first defined value; list traits instead accumulate ascending,
    /// honoring per-stratum replace markers. Falls back to the
    /// schema's declared default. Strata whose names are not in the
    /// order do not participate.
    ///
    /// # Errors
    ///
    /// Resolving an undeclared trait name fails fast with
    /// [`CatalogError::UndeclaredTrait`].
    pub fn resolve(&self, order: &StratumOrder, trait_name: &str) -> Result<Option<TraitValue>> {
        let definition = self.schema.require(trait_name)?;
        let revision = self.revision();
        let order_fingerprint = order.fingerprint();

        if let Some(entry) = self.cache.lock().get(trait_name) {
            if entry.revision == revision && entry.order == order_fingerprint {
                return Ok(entry.value.clone());
            }
        }

        let strata = self.strata.read();
        let value = if definition.kind == TraitKind::ObjectList {
            Self::resolve_list(&strata, order, trait_name, definition)
        } else {
            Self::resolve_scalar(&strata, order, trait_name, definition)
        };
        drop(strata);

        self.cache.lock().insert(
            trait_name.to_string(),
            CacheEntry {
                revision,
                order: order_fingerprint,
                value: value.clone(),
            },
        );
        Ok(value)
    }

    fn resolve_scalar(
        strata: &IndexMap<String, Stratum>,
        order: &StratumOrder,
        trait_name: &str,
        definition: &TraitDefinition,
    ) -> Option<TraitValue> {
        for stratum_name in order.descending() {
            if let Some(value) = strata.get(stratum_name).and_then(|s| s.get(trait_name)) {
                return Some(value.clone());
            }
        }
        definition.default.clone()
    }

    fn resolve_list(
        strata: &IndexMap<String, Stratum>,
        order: &StratumOrder,
        trait_name: &str,
        definition: &TraitDefinition,
    ) -> Option<TraitValue> {
        let mut items: Vec<JsonValue> = Vec::new();
        let mut defined = false;
        for stratum_name in order.ascending() {
            let Some(stratum) = strata.get(stratum_name) else {
                continue;
            };
            if let Some(value) = stratum.get(trait_name) {
                if stratum.replaces(trait_name) {
                    items.clear();
                }
                if let Some(list) = value.as_list() {
                    items.extend(list.iter().cloned());
                }
                defined = true;
            }
        }
        if defined {
            Some(TraitValue::List(items))
        } else {
            definition.default.clone()
        }
    }

    /// Resolve a string trait
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Model::resolve`].
    pub fn resolved_string(&self, order: &StratumOrder, trait_name: &str) -> Result<Option<String>> {
        Ok(self
            .resolve(order, trait_name)?
            .and_then(|v| v.as_str().map(ToString::to_string)))
    }

    /// Resolve a numeric trait
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Model::resolve`].
    pub fn resolved_number(&self, order: &StratumOrder, trait_name: &str) -> Result<Option<f64>> {
        Ok(self.resolve(order, trait_name)?.and_then(|v| v.as_number()))
    }

    /// Resolve a boolean trait
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Model::resolve`].
    pub fn resolved_bool(&self, order: &StratumOrder, trait_name: &str) -> Result<Option<bool>> {
        Ok(self.resolve(order, trait_name)?.and_then(|v| v.as_bool()))
    }

    /// Resolve a rectangle trait
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Model::resolve`].
    pub fn resolved_rectangle(
        &self,
        order: &StratumOrder,
        trait_name: &str,
    ) -> Result<Option<Rectangle>> {
        Ok(self
            .resolve(order, trait_name)?
            .and_then(|v| v.as_rectangle().copied()))
    }

    /// Resolve a list trait
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Model::resolve`].
    pub fn resolved_list(
        &self,
        order: &StratumOrder,
        trait_name: &str,
    ) -> Result<Vec<JsonValue>> {
        Ok(self
            .resolve(order, trait_name)?
            .and_then(|v| v.as_list().map(<[JsonValue]>::to_vec))
            .unwrap_or_default())
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("unique_id", &self.unique_id)
            .field("type_name", &self.type_name)
            .field("revision", &self.revision())
            .field("strata", &self.strata.read().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Mutable view of a model's strata, handed to [`Model::update`]
pub struct StrataMut<'a> {
    schema: &'a TraitSchema,
    strata: &'a mut IndexMap<String, Stratum>,
}

impl StrataMut<'_> {
    /// Set one trait at one stratum, creating the stratum if needed
    ///
    /// # Errors
    ///
    /// Fails for undeclared trait names or kind mismatches.
    pub fn set_trait(
        &mut self,
        stratum_name: &str,
        trait_name: &str,
        value: impl Into<TraitValue>,
    ) -> Result<()> {
        let value = value.into();
        self.schema.check(trait_name, &value)?;
        self.strata
            .entry(stratum_name.to_string())
            .or_default()
            .set(trait_name, value);
        Ok(())
    }

    /// Set a list trait that replaces lower strata instead of appending
    ///
    /// # Errors
    ///
    /// Fails for undeclared trait names or kind mismatches.
    pub fn set_trait_replacing(
        &mut self,
        stratum_name: &str,
        trait_name: &str,
        value: impl Into<TraitValue>,
    ) -> Result<()> {
        let value = value.into();
        self.schema.check(trait_name, &value)?;
        self.strata
            .entry(stratum_name.to_string())
            .or_default()
            .set_replacing(trait_name, value);
        Ok(())
    }

    /// Unset one trait at one stratum
    pub fn clear_trait(&mut self, stratum_name: &str, trait_name: &str) {
        if let Some(stratum) = self.strata.get_mut(stratum_name) {
            stratum.remove(trait_name);
        }
    }

    /// Install a stratum, replacing any prior stratum of the same name
    pub fn install_stratum(&mut self, name: impl Into<String>, stratum: Stratum) {
        self.strata.insert(name.into(), stratum);
    }

    /// Remove a stratum entirely
    pub fn remove_stratum(&mut self, name: &str) -> Option<Stratum> {
        self.strata.shift_remove(name)
    }
}
