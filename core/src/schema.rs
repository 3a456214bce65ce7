//! Declarative trait schemas
//!
//! A `TraitSchema` is the static description of one catalog member
//! type: which traits it declares, their semantic kinds, and their
//! declared defaults. Trait names are stable identifiers used as merge
//! keys across strata.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};
use crate::types::TraitValue;

/// Semantic kind of a declared trait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraitKind {
    /// Plain string
    String,
    /// Floating-point number
    Number,
    /// Boolean flag
    Bool,
    /// Geographic bounding rectangle
    Rectangle,
    /// Nested object
    Object,
    /// Ordered list of nested objects
    ObjectList,
}

impl TraitKind {
    /// Short name of this kind, used in error messages
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Rectangle => "rectangle",
            Self::Object => "object",
            Self::ObjectList => "list",
        }
    }

    /// Coerce a raw JSON value into a trait value of this kind
    ///
    /// Used when mapping semi-structured external metadata (portal
    /// item properties, SDMX annotations) onto declared traits.
    /// Returns `None` when the JSON shape does not fit the kind.
    #[must_use]
    pub fn coerce(self, value: &serde_json::Value) -> Option<TraitValue> {
        match self {
            Self::String => value.as_str().map(TraitValue::from),
            Self::Number => value.as_f64().map(TraitValue::Number),
            Self::Bool => value.as_bool().map(TraitValue::Bool),
            Self::Rectangle => serde_json::from_value(value.clone())
                .ok()
                .map(TraitValue::Rectangle),
            Self::Object => Some(TraitValue::Object(value.clone())),
            Self::ObjectList => value
                .as_array()
                .map(|items| TraitValue::List(items.clone())),
        }
    }

    /// Whether a value is acceptable for this kind
    #[must_use]
    pub fn accepts(self, value: &TraitValue) -> bool {
        matches!(
            (self, value),
            (Self::String, TraitValue::String(_))
                | (Self::Number, TraitValue::Number(_))
                | (Self::Bool, TraitValue::Bool(_))
                | (Self::Rectangle, TraitValue::Rectangle(_))
                | (Self::Object, TraitValue::Object(_))
                | (Self::ObjectList, TraitValue::List(_))
        )
    }
}

/// Declaration of a single trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitDefinition {
    /// Stable trait name, used as the merge key
    pub name: String,

    /// Semantic kind
    pub kind: TraitKind,

    /// Human-readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared default, returned when no stratum defines the trait
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<TraitValue>,
}

impl TraitDefinition {
    /// Create a trait declaration without a default
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TraitKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            default: None,
        }
    }

    /// Attach a declared default
    #[must_use]
    pub fn with_default(mut self, default: impl Into<TraitValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Attach a description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Static schema for one catalog member type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraitSchema {
    /// Type discriminator this schema belongs to
    pub type_name: String,

    /// Declared traits, keyed by name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub traits: IndexMap<String, TraitDefinition>,
}

impl TraitSchema {
    /// Create an empty schema for a type discriminator
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            traits: IndexMap::new(),
        }
    }

    /// Declare a trait on this schema
    #[must_use]
    pub fn with_trait(mut self, definition: TraitDefinition) -> Self {
        self.traits.insert(definition.name.clone(), definition);
        self
    }

    /// Whether the schema declares a trait name
    #[must_use]
    pub fn declares(&self, trait_name: &str) -> bool {
        self.traits.contains_key(trait_name)
    }

    /// Look up a declared trait
    #[must_use]
    pub fn get(&self, trait_name: &str) -> Option<&TraitDefinition> {
        self.traits.get(trait_name)
    }

    /// Look up a declared trait, failing fast on undeclared names
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UndeclaredTrait`] when the name is not
    /// declared by this schema.
    pub fn require(&self, trait_name: &str) -> Result<&TraitDefinition> {
        self.traits
            .get(trait_name)
            .ok_or_else(|| CatalogError::undeclared_trait(trait_name, &self.type_name))
    }

    /// Check a value against the declared kind of a trait
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UndeclaredTrait`] for unknown names and
    /// [`CatalogError::TraitType`] for kind mismatches.
    pub fn check(&self, trait_name: &str, value: &TraitValue) -> Result<()> {
        let definition = self.require(trait_name)?;
        if definition.kind.accepts(value) {
            Ok(())
        } else {
            Err(CatalogError::trait_type(
                trait_name,
                definition.kind.name(),
                value.kind_name(),
            ))
        }
    }

    /// Names of all declared traits, in declaration order
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.traits.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rectangle;
    use pretty_assertions::assert_eq;

    fn sample_schema() -> TraitSchema {
        TraitSchema::new("wms")
            .with_trait(TraitDefinition::new("url", TraitKind::String))
            .with_trait(
                TraitDefinition::new("opacity", TraitKind::Number).with_default(0.8),
            )
            .with_trait(TraitDefinition::new("rectangle", TraitKind::Rectangle))
            .with_trait(TraitDefinition::new("legends", TraitKind::ObjectList))
    }

    #[test]
    fn test_declares_and_require() {
        let schema = sample_schema();
        assert!(schema.declares("url"));
        assert!(!schema.declares("tileWidth"));

        let err = schema.require("tileWidth").unwrap_err();
        assert!(matches!(err, CatalogError::UndeclaredTrait { .. }));
    }

    #[test]
    fn test_kind_checking() {
        let schema = sample_schema();
        schema.check("url", &TraitValue::from("https://example.com/wms")).unwrap();
        schema
            .check(
                "rectangle",
                &TraitValue::from(Rectangle::new(96.0, -45.0, 168.0, -8.0)),
            )
            .unwrap();

        let err = schema.check("opacity", &TraitValue::from("opaque")).unwrap_err();
        assert!(matches!(err, CatalogError::TraitType { .. }));
    }

    #[test]
    fn test_default_declared_on_definition() {
        let schema = sample_schema();
        assert_eq!(
            schema.get("opacity").and_then(|d| d.default.clone()),
            Some(TraitValue::Number(0.8))
        );
    }
}
