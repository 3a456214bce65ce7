//! Loadable stratum lifecycle
//!
//! A loadable stratum is produced by an asynchronous load against an
//! external data source and installed into a model under a fixed,
//! globally unique stratum name. Re-loading replaces the prior
//! stratum of the same name; it never merges with it. The loaded
//! value keeps a snapshot of the external data it was computed from so
//! it can be duplicated onto a new model without refetching.

use parking_lot::Mutex;

use geocatalog_core::Stratum;

use crate::model::Model;

/// Load lifecycle of an asynchronously populated stratum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// No load attempted yet
    #[default]
    Unloaded,
    /// A load is in flight
    Loading,
    /// The last load succeeded
    Loaded,
    /// The last load failed
    Failed,
}

/// Tracks the load lifecycle of one loadable stratum on one model
#[derive(Debug, Default)]
pub struct LoadTracker {
    state: Mutex<LoadState>,
}

impl LoadTracker {
    /// Create a tracker in the unloaded state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current load state
    #[must_use]
    pub fn state(&self) -> LoadState {
        *self.state.lock()
    }

    /// Mark a load as started
    pub fn begin(&self) {
        *self.state.lock() = LoadState::Loading;
    }

    /// Record the outcome of a load
    pub fn finish(&self, succeeded: bool) {
        *self.state.lock() = if succeeded {
            LoadState::Loaded
        } else {
            LoadState::Failed
        };
    }
}

/// A stratum computed from externally fetched data
pub trait LoadableStratum: Send + Sync {
    /// Fixed stratum name owned by this stratum class
    ///
    /// Names are registered once into the stratum order at wiring
    /// time, which makes collisions impossible by construction.
    fn stratum_name(&self) -> &'static str;

    /// Project the loaded data into trait values
    fn to_stratum(&self) -> Stratum;

    /// Clone this loaded stratum for attachment to another model
    ///
    /// Carries the already-fetched snapshot so the new model does not
    /// refetch.
    fn duplicate(&self) -> Box<dyn LoadableStratum>;
}

/// Install a loaded stratum into a model under its fixed name
pub fn install_loadable(model: &Model, loadable: &dyn LoadableStratum) {
    model.install_stratum(loadable.stratum_name(), loadable.to_stratum());
}
