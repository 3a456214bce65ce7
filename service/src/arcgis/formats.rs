//! Format rule table and matching
//!
//! A format rule pairs optional regexes over the portal item's `type`
//! string and service URL with the definition of the catalog item type
//! to instantiate. Rules are evaluated in declaration order and the
//! first match wins, so narrower rules must precede broader ones.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use geocatalog_core::{CatalogError, Result};

/// A format rule as declared in traits, patterns still as strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SupportedFormat {
    /// Rule id, e.g. `ArcGIS FeatureServer`
    pub id: String,

    /// Pattern over the item's declared type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format_regex: Option<String>,

    /// Pattern over the item's service URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_regex: Option<String>,

    /// Definition of the target catalog item, must carry `type`
    pub definition: JsonValue,
}

impl SupportedFormat {
    fn new(
        id: &str,
        format_regex: Option<&str>,
        url_regex: Option<&str>,
        definition: JsonValue,
    ) -> Self {
        Self {
            id: id.to_string(),
            format_regex: format_regex.map(ToString::to_string),
            url_regex: url_regex.map(ToString::to_string),
            definition,
        }
    }
}

/// A format rule with its patterns compiled
#[derive(Debug, Clone)]
pub struct PreparedFormat {
    /// Rule id
    pub id: String,

    /// Compiled type pattern
    pub format_regex: Option<Regex>,

    /// Compiled URL pattern
    pub url_regex: Option<Regex>,

    /// Definition of the target catalog item
    pub definition: JsonValue,
}

impl PreparedFormat {
    /// Type discriminator this rule resolves to
    #[must_use]
    pub fn target_type(&self) -> Option<&str> {
        self.definition.get("type").and_then(JsonValue::as_str)
    }

    /// Whether this rule matches an item's type and URL
    ///
    /// Every present regex must match; a rule with no regexes matches
    /// nothing.
    #[must_use]
    pub fn matches(&self, item_type: &str, url: &str) -> bool {
        if self.format_regex.is_none() && self.url_regex.is_none() {
            return false;
        }
        if let Some(re) = &self.format_regex {
            if !re.is_match(item_type) {
                return false;
            }
        }
        if let Some(re) = &self.url_regex {
            if !re.is_match(url) {
                return false;
            }
        }
        true
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| CatalogError::Pattern {
            message: e.to_string(),
            pattern: Some(pattern.to_string()),
        })
}

/// Compile a declared rule list
///
/// Recomputed whenever the declaring trait list changes; compilation
/// errors fail the whole table because a silently dropped rule would
/// shift first-match ordering.
///
/// # Errors
///
/// Returns [`CatalogError::Pattern`] for invalid patterns.
pub fn prepare_formats(declared: &[SupportedFormat]) -> Result<Vec<PreparedFormat>> {
    declared
        .iter()
        .map(|format| {
            Ok(PreparedFormat {
                id: format.id.clone(),
                format_regex: format.format_regex.as_deref().map(compile).transpose()?,
                url_regex: format.url_regex.as_deref().map(compile).transpose()?,
                definition: format.definition.clone(),
            })
        })
        .collect()
}

/// First rule matching the item's type and URL, in declaration order
#[must_use]
pub fn match_format<'a>(
    formats: &'a [PreparedFormat],
    item_type: &str,
    url: &str,
) -> Option<&'a PreparedFormat> {
    formats.iter().find(|format| format.matches(item_type, url))
}

static DEFAULT_FORMATS: Lazy<Vec<SupportedFormat>> = Lazy::new(|| {
    vec![
        SupportedFormat::new(
            "I3S",
            Some("Scene Service"),
            Some("SceneServer"),
            json!({ "type": "3d-tiles" }),
        ),
        SupportedFormat::new("WMS", Some("WMS"), Some("WMSServer"), json!({ "type": "wms" })),
        SupportedFormat::new(
            "ArcGIS MapServer Group",
            Some("Map Service"),
            Some(r"MapServer/?$"),
            json!({ "type": "esri-mapServer-group" }),
        ),
        SupportedFormat::new(
            "ArcGIS MapServer",
            Some("Map Service"),
            Some(r"MapServer/\d+/?$"),
            json!({ "type": "esri-mapServer" }),
        ),
        SupportedFormat::new(
            "ArcGIS FeatureServer Group",
            Some("Feature Service"),
            Some(r"FeatureServer/?$"),
            json!({ "type": "esri-featureServer-group" }),
        ),
        SupportedFormat::new(
            "ArcGIS FeatureServer",
            Some("Feature Service"),
            Some(r"FeatureServer/\d+/?$"),
            json!({ "type": "esri-featureServer" }),
        ),
        SupportedFormat::new("KML", Some("KML"), None, json!({ "type": "kml" })),
    ]
});

/// The built-in rule table, in matching order
#[must_use]
pub fn default_supported_formats() -> &'static [SupportedFormat] {
    &DEFAULT_FORMATS
}
