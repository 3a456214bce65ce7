//! Global stratum priority ordering
//!
//! The order of strata is not a property of any one model: it is a
//! single ordered configuration built once at initialization and
//! passed by reference into the resolution engine. Loader strata
//! register their fixed names here during wiring; each name may be
//! registered exactly once, which makes stratum-name collisions
//! impossible by construction.

use crate::error::{CatalogError, Result};

/// Name of the lowest-priority stratum holding declared defaults
pub const DEFAULTS_STRATUM: &str = "defaults";

/// Name of the stratum holding the catalog definition
pub const DEFINITION_STRATUM: &str = "definition";

/// Name of the highest-priority stratum holding user overrides
pub const OVERRIDE_STRATUM: &str = "override";

/// Ordered list of stratum names, lowest priority first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratumOrder {
    names: Vec<String>,
}

impl StratumOrder {
    /// The standard order: `defaults < definition < override`
    ///
    /// Loader strata are registered between `definition` and
    /// `override` via [`StratumOrder::register_load_stratum`].
    #[must_use]
    pub fn standard() -> Self {
        Self {
            names: vec![
                DEFAULTS_STRATUM.to_string(),
                DEFINITION_STRATUM.to_string(),
                OVERRIDE_STRATUM.to_string(),
            ],
        }
    }

    /// Register a loader stratum name just below the override stratum
    ///
    /// Registration order among loader strata determines their
    /// relative priority: later registrations rank higher.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateStratum`] when the name is
    /// already registered.
    pub fn register_load_stratum(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(CatalogError::DuplicateStratum(name));
        }
        let at = self
            .names
            .iter()
            .position(|n| n == OVERRIDE_STRATUM)
            .unwrap_or(self.names.len());
        self.names.insert(at, name);
        Ok(())
    }

    /// Builder form of [`StratumOrder::register_load_stratum`]
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateStratum`] on repeated names.
    pub fn with_load_stratum(mut self, name: impl Into<String>) -> Result<Self> {
        self.register_load_stratum(name)?;
        Ok(self)
    }

    /// Priority index of a stratum name; higher means higher priority
    #[must_use]
    pub fn priority(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Stable fingerprint of this order's contents
    ///
    /// Resolved-value caches key entries on it, so the same model can
    /// be resolved under different orders without stale hits.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.names.hash(&mut hasher);
        hasher.finish()
    }

    /// Whether the order knows a stratum name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.priority(name).is_some()
    }

    /// Stratum names from lowest to highest priority
    pub fn ascending(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Stratum names from highest to lowest priority
    pub fn descending(&self) -> impl Iterator<Item = &str> {
        self.names.iter().rev().map(String::as_str)
    }

    /// Number of registered stratum names
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the order is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for StratumOrder {
    fn default() -> Self {
        Self::standard()
    }
}
