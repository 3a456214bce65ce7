//! Portal item JSON models
//!
//! Shapes returned by
//! `{portalRoot}/sharing/rest/content/items/{id}?f=json` and the
//! best-effort `.../{id}/data?f=json` sub-resource. Fields the catalog
//! does not consume are dropped during deserialization.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use geocatalog_core::Rectangle;

/// An ArcGIS portal item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortalItem {
    /// Item id
    pub id: Option<String>,

    /// Declared item type, e.g. `Feature Service`
    #[serde(rename = "type")]
    pub item_type: Option<String>,

    /// Service URL
    pub url: Option<String>,

    /// Display title
    pub title: Option<String>,

    /// HTML description
    pub description: Option<String>,

    /// Extent as `[[west, south], [east, north]]` degrees
    pub extent: Vec<Vec<f64>>,

    /// License / attribution text
    pub license_info: Option<String>,

    /// Type keywords, e.g. `Tiled`
    pub type_keywords: Vec<String>,

    /// Spatial reference of the item
    pub spatial_reference: Option<JsonValue>,
}

impl PortalItem {
    /// Whether this is a tiled Map Service item
    ///
    /// Tiled map services do not expose a usable single-layer
    /// sub-resource and are always surfaced as a whole map server.
    #[must_use]
    pub fn is_tiled_map_service(&self) -> bool {
        self.item_type.as_deref() == Some("Map Service")
            && self.type_keywords.iter().any(|k| k == "Tiled")
    }

    /// Geographic rectangle of the item extent, when well-formed
    #[must_use]
    pub fn rectangle(&self) -> Option<Rectangle> {
        match self.extent.as_slice() {
            [min, max] if min.len() >= 2 && max.len() >= 2 => {
                Some(Rectangle::new(min[0], min[1], max[0], max[1]))
            }
            _ => None,
        }
    }
}

/// One layer listed by the item's `/data` sub-resource
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PortalItemLayer {
    /// Layer id within the service
    pub id: Option<i64>,
}

/// Response of the `/data?f=json` sub-resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalItemData {
    /// Layers the item pre-selects, if any
    pub layers: Vec<PortalItemLayer>,

    /// Error object returned with a 200 status
    pub error: Option<JsonValue>,
}

impl PortalItemData {
    /// Id of the first listed layer
    #[must_use]
    pub fn first_layer_id(&self) -> Option<i64> {
        if self.error.is_some() {
            return None;
        }
        self.layers.first().and_then(|layer| layer.id)
    }
}
