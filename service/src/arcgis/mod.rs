//! ArcGIS portal item reference and format matching
//!
//! A portal item reference fetches item metadata from an ArcGIS
//! portal's sharing REST API, selects a concrete catalog item type via
//! an ordered table of regex-based format rules, and resolves into a
//! target model of that type.

/// Portal item JSON models
pub mod item;

/// Format rule table and matching
pub mod formats;

/// The portal item reference state machine
pub mod reference;

/// Loaded stratum carrying portal item metadata
pub mod stratum;

/// Fixed stratum name owned by the portal item stratum
pub const ARCGIS_PORTAL_ITEM_STRATUM: &str = "arcgisPortalItem";

/// Prefix prepended to Scene Service URLs resolved as 3D Tiles
pub const I3S_TO_3DTILES_PREFIX: &str = "/i3s-to-3dtiles/";

pub use formats::{default_supported_formats, match_format, PreparedFormat, SupportedFormat};
pub use item::{PortalItem, PortalItemData, PortalItemLayer};
pub use reference::ArcGisPortalItemReference;
pub use stratum::ArcGisPortalItemStratum;
