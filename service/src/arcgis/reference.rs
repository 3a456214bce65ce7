//! The portal item reference state machine
//!
//! Resolution proceeds in strictly sequential steps for one reference:
//! primary metadata load, format match, best-effort secondary metadata
//! refinement, re-match, target instantiation. Re-resolving after the
//! reference's defining strata change redoes all steps from scratch.

use std::sync::Arc;

use serde_json::{json, Value as JsonValue};
use tracing::debug;

use geocatalog_core::prelude::*;

use crate::arcgis::formats::{
    default_supported_formats, match_format, prepare_formats, PreparedFormat, SupportedFormat,
};
use crate::arcgis::item::{PortalItem, PortalItemData};
use crate::arcgis::stratum::ArcGisPortalItemStratum;
use crate::arcgis::I3S_TO_3DTILES_PREFIX;
use crate::fetch::{cache_window, proxy_url};
use crate::loadable::{install_loadable, LoadTracker};
use crate::model::Model;
use crate::reference::{ReferenceCell, ResolutionState, ResolveContext};

const DEFAULT_PORTAL_ROOT: &str = "https://www.arcgis.com";
const PORTAL_ITEM_CACHE: &str = "1d";
const LOAD_ERROR_TITLE: &str = "Could not load ArcGIS portal item";

/// A reference model backed by an ArcGIS portal item
pub struct ArcGisPortalItemReference {
    model: Arc<Model>,
    formats: Vec<PreparedFormat>,
    cell: ReferenceCell,
    tracker: LoadTracker,
}

impl ArcGisPortalItemReference {
    /// Create a reference using the built-in format rule table
    ///
    /// # Errors
    ///
    /// Never fails for the built-in table; kept fallible because the
    /// table is compiled here.
    pub fn new(model: Arc<Model>) -> Result<Self> {
        Self::with_formats(model, default_supported_formats())
    }

    /// Create a reference with a custom format rule table
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Pattern`] when a declared rule does not
    /// compile.
    pub fn with_formats(model: Arc<Model>, formats: &[SupportedFormat]) -> Result<Self> {
        Ok(Self {
            model,
            formats: prepare_formats(formats)?,
            cell: ReferenceCell::new(),
            tracker: LoadTracker::new(),
        })
    }

    /// The reference's own model
    #[must_use]
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    /// Cached resolution state without triggering a resolve
    pub async fn current_state(&self) -> ResolutionState {
        self.cell.current().await
    }

    /// Resolve the reference into its target model
    ///
    /// Idempotent: the cached target is reused until the reference's
    /// strata change. On success the target is registered (replacing
    /// any previous target of the same id, last write wins).
    ///
    /// # Errors
    ///
    /// Fatal load failures (unreachable portal, malformed item JSON,
    /// missing item id) propagate; an item matching no format rule
    /// resolves to [`ResolutionState::Unresolvable`] instead.
    pub async fn resolve(&self, ctx: &ResolveContext) -> Result<ResolutionState> {
        let revision = self.model.revision();
        self.tracker.begin();
        let result = self
            .cell
            .resolve_with(revision, || self.resolve_from_scratch(ctx))
            .await;
        self.tracker.finish(result.is_ok());
        result
    }

    async fn resolve_from_scratch(&self, ctx: &ResolveContext) -> Result<ResolutionState> {
        let item = self.load_portal_item(ctx).await?;
        let item_type = item.item_type.clone().unwrap_or_default();
        let item_url = item.url.clone().unwrap_or_default();

        let mut matched = match_format(&self.formats, &item_type, &item_url).cloned();
        let mut resolved_url = item_url.clone();

        // Secondary metadata can narrow a group service down to one layer.
        if !item_url.is_empty() {
            if let Some(layer_id) = self
                .load_item_data(ctx)
                .await
                .and_then(|data| data.first_layer_id())
            {
                let refined = format!("{}/{layer_id}", item_url.trim_end_matches('/'));
                if let Some(refined_match) = match_format(&self.formats, &item_type, &refined) {
                    matched = Some(refined_match.clone());
                    resolved_url = refined;
                }
            }
        }

        // Tiled map services never resolve to a single-layer sub-resource.
        if item.is_tiled_map_service() {
            matched = Some(PreparedFormat {
                id: "ArcGIS MapServer".to_string(),
                format_regex: None,
                url_regex: None,
                definition: json!({ "type": "esri-mapServer" }),
            });
            resolved_url.clone_from(&item_url);
        }

        let Some(matched) = matched else {
            debug!(
                item_type,
                url = item_url,
                "portal item matched no format rule"
            );
            return Ok(ResolutionState::Unresolvable);
        };
        let target_type = matched.target_type().ok_or_else(|| {
            CatalogError::config(format!("format rule '{}' has no definition type", matched.id))
        })?;
        if matched.id == "I3S" {
            resolved_url = format!("{I3S_TO_3DTILES_PREFIX}{resolved_url}");
        }

        let target_id = format!("{}/target", self.model.unique_id());
        let target = ctx.factory.create(target_type, target_id)?;

        // Carry the reference's definition onto the target, minus its
        // url: the target derives its own URL from the matched item.
        if let Some(mut definition) = self.model.stratum(DEFINITION_STRATUM) {
            definition.remove("url");
            target.install_stratum(DEFINITION_STRATUM, definition);
        }

        install_loadable(&target, &ArcGisPortalItemStratum::new(item, Some(resolved_url)));

        if let Some(props) = self.model.resolve(&ctx.order, "itemProperties")? {
            if let Some(object) = props.as_object().and_then(JsonValue::as_object) {
                apply_item_properties(&target, object)?;
            }
        }

        ctx.registry.insert_or_replace(Arc::clone(&target));
        Ok(ResolutionState::Resolved {
            target_id: target.unique_id().to_string(),
        })
    }

    async fn load_portal_item(&self, ctx: &ResolveContext) -> Result<PortalItem> {
        let root = self
            .model
            .resolved_string(&ctx.order, "url")?
            .unwrap_or_else(|| DEFAULT_PORTAL_ROOT.to_string());
        let item_id = self.model.resolved_string(&ctx.order, "itemId")?.ok_or_else(|| {
            CatalogError::structural(LOAD_ERROR_TITLE, "The reference does not specify an item id.")
        })?;

        let url = format!(
            "{}/sharing/rest/content/items/{item_id}?f=json",
            root.trim_end_matches('/')
        );
        let proxied = proxy_url(&ctx.config.proxy, &url, PORTAL_ITEM_CACHE);
        let value = ctx
            .fetcher
            .fetch_json_cached(&proxied, cache_window(PORTAL_ITEM_CACHE))
            .await?;

        if let Some(error) = value.get("error") {
            return Err(CatalogError::structural(
                LOAD_ERROR_TITLE,
                format!("The portal returned an error for item '{item_id}': {error}"),
            ));
        }
        let item: PortalItem = serde_json::from_value(value)
            .map_err(|e| CatalogError::structural(LOAD_ERROR_TITLE, e.to_string()))?;
        if item.id.is_none() {
            return Err(CatalogError::structural(
                LOAD_ERROR_TITLE,
                format!("The response for item '{item_id}' does not describe a portal item."),
            ));
        }
        Ok(item)
    }

    /// Best-effort fetch of the item's `/data` sub-resource
    ///
    /// Failures are swallowed and treated as "no additional info".
    async fn load_item_data(&self, ctx: &ResolveContext) -> Option<PortalItemData> {
        let root = self
            .model
            .resolved_string(&ctx.order, "url")
            .ok()?
            .unwrap_or_else(|| DEFAULT_PORTAL_ROOT.to_string());
        let item_id = self.model.resolved_string(&ctx.order, "itemId").ok()??;

        let url = format!(
            "{}/sharing/rest/content/items/{item_id}/data?f=json",
            root.trim_end_matches('/')
        );
        let proxied = proxy_url(&ctx.config.proxy, &url, PORTAL_ITEM_CACHE);
        match ctx
            .fetcher
            .fetch_json_cached(&proxied, cache_window(PORTAL_ITEM_CACHE))
            .await
        {
            Ok(value) => serde_json::from_value(value).ok(),
            Err(error) => {
                debug!(%error, item_id, "item data fetch failed, continuing without it");
                None
            }
        }
    }
}

fn apply_item_properties(
    target: &Model,
    properties: &serde_json::Map<String, JsonValue>,
) -> Result<()> {
    target.update(|strata| {
        for (key, raw) in properties {
            let Some(definition) = target.schema().get(key) else {
                debug!(trait_name = %key, "itemProperties key not declared by target, skipping");
                continue;
            };
            if let Some(value) = definition.kind.coerce(raw) {
                strata.set_trait(OVERRIDE_STRATUM, key, value)?;
            } else {
                debug!(trait_name = %key, "itemProperties value has wrong shape, skipping");
            }
        }
        Ok(())
    })
}
