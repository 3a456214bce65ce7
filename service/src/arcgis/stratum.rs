//! Loaded stratum carrying portal item metadata
//!
//! Maps a fetched [`PortalItem`] into trait values on the resolved
//! target model. The stratum keeps the item snapshot it was computed
//! from, so duplicating it onto another model carries the metadata
//! without refetching.

use geocatalog_core::Stratum;

use crate::arcgis::item::PortalItem;
use crate::arcgis::ARCGIS_PORTAL_ITEM_STRATUM;
use crate::loadable::LoadableStratum;

/// Portal item metadata projected as a loaded stratum
#[derive(Debug, Clone)]
pub struct ArcGisPortalItemStratum {
    item: PortalItem,
    resolved_url: Option<String>,
}

impl ArcGisPortalItemStratum {
    /// Create from a fetched item and the format-matched service URL
    #[must_use]
    pub fn new(item: PortalItem, resolved_url: Option<String>) -> Self {
        Self { item, resolved_url }
    }

    /// The item snapshot this stratum was computed from
    #[must_use]
    pub fn item(&self) -> &PortalItem {
        &self.item
    }
}

impl LoadableStratum for ArcGisPortalItemStratum {
    fn stratum_name(&self) -> &'static str {
        ARCGIS_PORTAL_ITEM_STRATUM
    }

    fn to_stratum(&self) -> Stratum {
        let mut stratum = Stratum::new();
        if let Some(url) = &self.resolved_url {
            stratum.set("url", url.as_str());
        }
        if let Some(title) = &self.item.title {
            stratum.set("name", title.as_str());
        }
        if let Some(description) = &self.item.description {
            stratum.set("description", description.as_str());
        }
        if let Some(license) = &self.item.license_info {
            stratum.set("attribution", license.as_str());
        }
        if let Some(rectangle) = self.item.rectangle() {
            stratum.set("rectangle", rectangle);
        }
        stratum
    }

    fn duplicate(&self) -> Box<dyn LoadableStratum> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geocatalog_core::TraitValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> ArcGisPortalItemStratum {
        let item: PortalItem = serde_json::from_value(json!({
            "id": "abc",
            "type": "Feature Service",
            "title": "Foo layer",
            "description": "<p>About Foo</p>",
            "licenseInfo": "CC-BY",
            "extent": [[96.0, -45.0], [168.0, -8.0]]
        }))
        .expect("valid item");
        ArcGisPortalItemStratum::new(item, Some("https://x/FeatureServer/3".to_string()))
    }

    #[test]
    fn test_projection() {
        let stratum = sample().to_stratum();
        assert_eq!(
            stratum.get("url").and_then(TraitValue::as_str),
            Some("https://x/FeatureServer/3")
        );
        assert_eq!(
            stratum.get("name").and_then(TraitValue::as_str),
            Some("Foo layer")
        );
        assert_eq!(
            stratum.get("attribution").and_then(TraitValue::as_str),
            Some("CC-BY")
        );
        assert!(stratum.get("rectangle").is_some());
    }

    #[test]
    fn test_duplicate_projects_identically() {
        let original = sample();
        let copy = original.duplicate();
        assert_eq!(original.to_stratum(), copy.to_stratum());
        assert_eq!(copy.stratum_name(), ARCGIS_PORTAL_ITEM_STRATUM);
    }
}
