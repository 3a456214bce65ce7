//! Reference resolution state machine
//!
//! A reference is a model that, once asynchronously resolved, produces
//! a concrete target model of a dynamically selected type. Resolution
//! is idempotent: repeated resolves reuse the cached target until the
//! reference's defining strata change (observed through the model's
//! revision counter), at which point resolution is redone from
//! scratch. The target is held as an id looked up in the model
//! registry, not as a direct cyclic object reference.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

use geocatalog_core::{CatalogConfig, Result, StratumOrder};

use crate::factory::CatalogMemberFactory;
use crate::fetch::CachingFetcher;
use crate::registry::ModelRegistry;

/// Outcome of resolving a reference
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolutionState {
    /// Not resolved yet
    #[default]
    Unresolved,
    /// Resolved into a registered target model
    Resolved {
        /// Unique id of the target model in the registry
        target_id: String,
    },
    /// Metadata matched no known format; there is no target
    Unresolvable,
}

impl ResolutionState {
    /// Target id when resolved
    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::Resolved { target_id } => Some(target_id),
            _ => None,
        }
    }
}

/// Shared collaborators handed into every resolution
pub struct ResolveContext {
    /// Fetcher used for metadata loads
    pub fetcher: Arc<CachingFetcher>,
    /// Registry resolved targets are installed into
    pub registry: Arc<ModelRegistry>,
    /// Factory used to instantiate targets by type discriminator
    pub factory: Arc<CatalogMemberFactory>,
    /// Global stratum order
    pub order: Arc<StratumOrder>,
    /// Catalog configuration (proxy, cache windows)
    pub config: CatalogConfig,
}

struct CachedResolution {
    revision: u64,
    state: ResolutionState,
}

/// Per-reference resolution cache
///
/// The internal async mutex also serializes one reference's resolution
/// sequence: metadata load, format match, secondary refinement and
/// target instantiation never overlap for the same reference.
/// Different references resolve independently.
#[derive(Default)]
pub struct ReferenceCell {
    inner: Mutex<Option<CachedResolution>>,
}

impl ReferenceCell {
    /// Create an unresolved cell
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve through the cache
    ///
    /// Reuses the cached state while `revision` matches the revision
    /// it was computed at; otherwise runs `resolve` and caches its
    /// outcome. A failed resolve leaves the cell unresolved so the
    /// next call retries.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error.
    pub async fn resolve_with<F, Fut>(&self, revision: u64, resolve: F) -> Result<ResolutionState>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ResolutionState>>,
    {
        let mut guard = self.inner.lock().await;
        if let Some(cached) = guard.as_ref() {
            if cached.revision == revision {
                return Ok(cached.state.clone());
            }
        }
        let state = resolve().await?;
        *guard = Some(CachedResolution {
            revision,
            state: state.clone(),
        });
        Ok(state)
    }

    /// Current cached state, if any
    pub async fn current(&self) -> ResolutionState {
        self.inner
            .lock()
            .await
            .as_ref()
            .map_or(ResolutionState::Unresolved, |c| c.state.clone())
    }

    /// Drop the cached resolution
    pub async fn invalidate(&self) {
        *self.inner.lock().await = None;
    }
}
