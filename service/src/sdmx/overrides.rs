//! Per-concept and per-codelist overrides
//!
//! Overrides let a catalog definition adjust how a dataflow's
//! dimensions are surfaced without per-dataset code: rename a
//! dimension, replace its options, preselect or disable it, or pin
//! its region type. Overrides are keyed by concept or codelist URN;
//! when both apply to one dimension, the codelist-level override wins.

use serde::{Deserialize, Serialize};

/// One selectable option of a dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionOption {
    /// Option id (code id)
    pub id: String,

    /// Display label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DimensionOption {
    /// Create an option with a label
    #[must_use]
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self { id: id.into(), name }
    }

    /// Display label, falling back to the id
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Find/replace aliasing applied to a matched region type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindReplace {
    /// Substring to find
    pub find: String,
    /// Replacement
    pub replace: String,
}

/// Override keyed by a concept or codelist URN
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelOverride {
    /// Concept or codelist URN this override applies to
    pub id: Option<String>,

    /// Model-override type: `unit-measure`, `unit-multiplier`,
    /// `frequency`, `region`, or `region-type`
    #[serde(rename = "type")]
    pub override_type: Option<String>,

    /// Replacement display name
    pub name: Option<String>,

    /// Replacement option list
    pub options: Vec<DimensionOption>,

    /// Preselected option id
    pub selected_id: Option<String>,

    /// Allow the dimension to have no selection
    pub allow_undefined: bool,

    /// Disable the dimension entirely
    pub disable: bool,

    /// Explicit region type for this dimension
    pub region_type: Option<String>,

    /// Delegate the region type to another dimension's selected value
    pub region_type_from_dimension_id: Option<String>,

    /// Aliasing applied to the matched region type
    pub region_type_replacements: Vec<FindReplace>,
}

impl ModelOverride {
    /// Apply this override's region-type aliasing
    #[must_use]
    pub fn alias_region_type(&self, region_type: &str) -> String {
        let mut aliased = region_type.to_string();
        for rule in &self.region_type_replacements {
            aliased = aliased.replace(&rule.find, &rule.replace);
        }
        aliased
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_option_label_fallback() {
        assert_eq!(DimensionOption::new("Q", None).label(), "Q");
        assert_eq!(
            DimensionOption::new("Q", Some("Quarterly".to_string())).label(),
            "Quarterly"
        );
    }

    #[test]
    fn test_region_type_aliasing() {
        let ov = ModelOverride {
            region_type_replacements: vec![FindReplace {
                find: "_2016".to_string(),
                replace: String::new(),
            }],
            ..ModelOverride::default()
        };
        assert_eq!(ov.alias_region_type("SA4_2016"), "SA4");
        assert_eq!(ov.alias_region_type("STE"), "STE");
    }

    #[test]
    fn test_deserialize_from_definition() {
        let ov: ModelOverride = serde_json::from_str(
            r#"{
                "id": "urn:codelist.CL_FREQ",
                "type": "frequency",
                "selectedId": "Q",
                "allowUndefined": false
            }"#,
        )
        .unwrap();
        assert_eq!(ov.override_type.as_deref(), Some("frequency"));
        assert_eq!(ov.selected_id.as_deref(), Some("Q"));
    }
}
