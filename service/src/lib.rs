//! # Geocatalog Service
//!
//! Stratified catalog model service for geospatial data catalogs.
//!
//! This crate implements the resolution engine that merges named
//! strata of trait values into a single resolved view per catalog
//! item, asynchronous loadable strata backed by external metadata
//! services, and reference models that resolve into concrete catalog
//! items after fetching remote metadata.
//!
//! ## Overview
//!
//! - **Models** hold an ordered map of strata; resolved trait values
//!   are a pure function of the strata contents and the global
//!   [`StratumOrder`](geocatalog_core::StratumOrder).
//! - **Loadable strata** are produced by async loads against external
//!   sources (ArcGIS portal REST, SDMX-JSON structure API) and
//!   installed under fixed, globally unique stratum names.
//! - **References** resolve asynchronously into target models of a
//!   dynamically selected type, via regex-based format matching and a
//!   string-keyed member factory.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use geocatalog_service::prelude::*;
//!
//! let (order, factory) = wire_catalog()?;
//! let registry = ModelRegistry::new();
//! let reference = ArcGisPortalItemReference::new(
//!     factory.create("arcgis-portal-item", "my-item")?,
//! );
//! let state = reference.resolve(&ctx).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Catalog models and the stratified resolution engine
pub mod model;

/// Shared model registry
pub mod registry;

/// String-keyed catalog member factory
pub mod factory;

/// JSON fetching, caching, and proxying
pub mod fetch;

/// Loadable stratum lifecycle
pub mod loadable;

/// Reference resolution state machine
pub mod reference;

/// ArcGIS portal item reference and format matching
pub mod arcgis;

/// SDMX-JSON dataflow stratum
pub mod sdmx;

/// Tabular column and style synthesis types
pub mod table;

/// Region-type matching
pub mod region;

/// HTML sanitization seam
pub mod sanitize;

pub use factory::{CatalogMemberFactory, ModelType};
pub use model::Model;
pub use reference::ResolutionState;
pub use registry::ModelRegistry;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::arcgis::reference::ArcGisPortalItemReference;
    pub use crate::factory::{wire_catalog, CatalogMemberFactory, ModelType};
    pub use crate::fetch::{CachingFetcher, HttpJsonFetcher, JsonFetcher};
    pub use crate::loadable::{install_loadable, LoadState, LoadableStratum};
    pub use crate::model::Model;
    pub use crate::reference::{ReferenceCell, ResolutionState, ResolveContext};
    pub use crate::registry::ModelRegistry;
    pub use crate::sdmx::stratum::SdmxJsonDataflowStratum;
    pub use geocatalog_core::prelude::*;
}
