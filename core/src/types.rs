//! Trait value types for the catalog model
//!
//! A trait value is one layerable field of a catalog item. Values are
//! deliberately close to JSON: external metadata (portal item
//! responses, SDMX structure messages) maps into them without a
//! schema-specific binding step.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Geographic bounding rectangle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Western-most longitude
    pub west: f64,
    /// Southern-most latitude
    pub south: f64,
    /// Eastern-most longitude
    pub east: f64,
    /// Northern-most latitude
    pub north: f64,
}

impl Rectangle {
    /// Create a rectangle from west/south/east/north degrees
    #[must_use]
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }
}

/// One resolvable value of a catalog trait
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    /// String value
    String(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Geographic rectangle
    Rectangle(Rectangle),
    /// Nested object value
    Object(JsonValue),
    /// Ordered list of nested values; merged by concatenation across strata
    List(Vec<JsonValue>),
}

impl TraitValue {
    /// Get the string content, if this is a string value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric content, if this is a number value
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the boolean content, if this is a boolean value
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the rectangle content, if this is a rectangle value
    #[must_use]
    pub fn as_rectangle(&self) -> Option<&Rectangle> {
        match self {
            Self::Rectangle(r) => Some(r),
            _ => None,
        }
    }

    /// Get the nested object, if this is an object value
    #[must_use]
    pub fn as_object(&self) -> Option<&JsonValue> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    /// Get the list items, if this is a list value
    #[must_use]
    pub fn as_list(&self) -> Option<&[JsonValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of this value's kind, used in error messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Rectangle(_) => "rectangle",
            Self::Object(_) => "object",
            Self::List(_) => "list",
        }
    }
}

impl From<&str> for TraitValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for TraitValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for TraitValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for TraitValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Rectangle> for TraitValue {
    fn from(value: Rectangle) -> Self {
        Self::Rectangle(value)
    }
}

impl From<Vec<JsonValue>> for TraitValue {
    fn from(items: Vec<JsonValue>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_accessors() {
        assert_eq!(TraitValue::from("wms").as_str(), Some("wms"));
        assert_eq!(TraitValue::from(3.0).as_number(), Some(3.0));
        assert_eq!(TraitValue::from(true).as_bool(), Some(true));
        assert_eq!(TraitValue::from("wms").as_number(), None);

        let list = TraitValue::List(vec![json!({"title": "Legend"})]);
        assert_eq!(list.as_list().map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(TraitValue::from("x").kind_name(), "string");
        assert_eq!(
            TraitValue::Rectangle(Rectangle::new(96.0, -45.0, 168.0, -8.0)).kind_name(),
            "rectangle"
        );
    }
}
