//! Named partial layers of trait values
//!
//! A stratum holds the subset of a model's traits that one source
//! defines. An absent entry means "not set at this layer" and lets the
//! next stratum down supply the value. A stratum is owned exclusively
//! by the model whose strata map holds it; sharing happens only via
//! explicit duplication.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::TraitValue;

/// One named, partial layer of trait values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    /// Trait values this layer defines
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    values: IndexMap<String, TraitValue>,

    /// List traits this layer replaces instead of appending to
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    replaced: HashSet<String>,
}

impl Stratum {
    /// Create an empty stratum
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a trait value at this layer
    pub fn set(&mut self, trait_name: impl Into<String>, value: impl Into<TraitValue>) {
        self.values.insert(trait_name.into(), value.into());
    }

    /// Set a list trait, marking it as replacing lower strata
    pub fn set_replacing(&mut self, trait_name: impl Into<String>, value: impl Into<TraitValue>) {
        let name = trait_name.into();
        self.replaced.insert(name.clone());
        self.values.insert(name, value.into());
    }

    /// Get the value this layer defines for a trait, if any
    #[must_use]
    pub fn get(&self, trait_name: &str) -> Option<&TraitValue> {
        self.values.get(trait_name)
    }

    /// Remove a trait from this layer
    pub fn remove(&mut self, trait_name: &str) -> Option<TraitValue> {
        self.replaced.remove(trait_name);
        self.values.shift_remove(trait_name)
    }

    /// Whether this layer replaces the given list trait
    #[must_use]
    pub fn replaces(&self, trait_name: &str) -> bool {
        self.replaced.contains(trait_name)
    }

    /// Whether this layer defines no traits
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of traits this layer defines
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Names of traits this layer defines
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Builder-style set, for constructing strata inline
    #[must_use]
    pub fn with(mut self, trait_name: impl Into<String>, value: impl Into<TraitValue>) -> Self {
        self.set(trait_name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_set_get_remove() {
        let mut stratum = Stratum::new();
        assert!(stratum.is_empty());

        stratum.set("url", "https://example.com/FeatureServer/3");
        stratum.set("opacity", 0.5);
        assert_eq!(stratum.len(), 2);
        assert_eq!(
            stratum.get("url").and_then(TraitValue::as_str),
            Some("https://example.com/FeatureServer/3")
        );

        assert!(stratum.remove("url").is_some());
        assert!(stratum.get("url").is_none());
    }

    #[test]
    fn test_replace_marker() {
        let mut stratum = Stratum::new();
        stratum.set("legends", TraitValue::List(vec![json!({"title": "a"})]));
        assert!(!stratum.replaces("legends"));

        stratum.set_replacing("legends", TraitValue::List(vec![json!({"title": "b"})]));
        assert!(stratum.replaces("legends"));

        stratum.remove("legends");
        assert!(!stratum.replaces("legends"));
    }
}
