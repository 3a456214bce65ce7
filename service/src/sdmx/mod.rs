//! SDMX-JSON dataflow stratum
//!
//! Translates one SDMX-JSON structural-metadata bundle (dataflow,
//! data structure, codelists, concept schemes, content constraints)
//! into generic tabular and dimensional trait values.

/// SDMX-JSON structure message models
pub mod structure;

/// Per-concept and per-codelist overrides
pub mod overrides;

/// The dataflow stratum and its derivations
pub mod stratum;

/// Fixed stratum name owned by the dataflow stratum
pub const SDMX_DATAFLOW_STRATUM: &str = "sdmxJsonDataflow";

pub use overrides::{DimensionOption, FindReplace, ModelOverride};
pub use structure::{SdmxJsonDataflow, SdmxStructureMessage};
pub use stratum::{SdmxDataflowParams, SdmxJsonDataflowStratum, SelectableDimension};
