//! # Geocatalog Core
//!
//! Core types for the stratified catalog model: trait schemas, trait
//! values, strata, the stratum priority order, and error handling.
//!
//! A catalog item is described by layers ("strata") of partial trait
//! values coming from different sources: declared defaults, the
//! catalog definition, server-loaded metadata, user overrides. This
//! crate defines those layers and the declarative schema they conform
//! to; the resolution engine that merges them lives in
//! `geocatalog-service`.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Core error types for catalog operations
pub mod error;

/// Trait value types
pub mod types;

/// Declarative trait schemas
pub mod schema;

/// Named partial layers of trait values
pub mod stratum;

/// Global stratum priority ordering
pub mod order;

/// Configuration types for the catalog service
pub mod config;

pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use order::{StratumOrder, DEFAULTS_STRATUM, DEFINITION_STRATUM, OVERRIDE_STRATUM};
pub use schema::{TraitDefinition, TraitKind, TraitSchema};
pub use stratum::Stratum;
pub use types::{Rectangle, TraitValue};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::{CatalogError, Result};
    pub use crate::order::*;
    pub use crate::schema::*;
    pub use crate::stratum::*;
    pub use crate::types::*;
}
