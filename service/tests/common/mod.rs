//! Shared fixtures for integration tests

// Each test binary compiles this module separately and uses a subset.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;

use geocatalog_service::prelude::*;

/// In-memory fetcher serving canned responses by exact URL
pub struct StaticFetcher {
    responses: HashMap<String, JsonValue>,
    calls: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, url: &str, value: JsonValue) -> Self {
        self.responses.insert(url.to_string(), value);
        self
    }

    /// How many times a URL reached this fetcher (cache misses only)
    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.as_str() == url).count()
    }
}

#[async_trait]
impl JsonFetcher for StaticFetcher {
    async fn fetch_json(&self, url: &str) -> Result<JsonValue> {
        self.calls.lock().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| CatalogError::fetch(url, "no canned response"))
    }
}

/// A resolve context wired the way a catalog process wires one,
/// backed by the given in-memory fetcher
pub fn context(fetcher: &Arc<StaticFetcher>) -> ResolveContext {
    let (order, factory) = wire_catalog().expect("catalog wiring");
    let inner: Arc<dyn JsonFetcher> = Arc::clone(fetcher) as Arc<dyn JsonFetcher>;
    ResolveContext {
        fetcher: Arc::new(CachingFetcher::new(inner, &CacheConfig::default())),
        registry: Arc::new(ModelRegistry::new()),
        factory: Arc::new(factory),
        order: Arc::new(order),
        config: CatalogConfig::default(),
    }
}

pub fn item_url(item_id: &str) -> String {
    format!("https://www.arcgis.com/sharing/rest/content/items/{item_id}?f=json")
}

pub fn item_data_url(item_id: &str) -> String {
    format!("https://www.arcgis.com/sharing/rest/content/items/{item_id}/data?f=json")
}

/// A portal item reference whose definition names the given item id
pub fn portal_reference(ctx: &ResolveContext, id: &str, item_id: &str) -> ArcGisPortalItemReference {
    let model = ctx
        .factory
        .create("arcgis-portal-item", id)
        .expect("registered type");
    model
        .set_trait(DEFINITION_STRATUM, "itemId", item_id)
        .expect("declared trait");
    ArcGisPortalItemReference::new(model).expect("built-in format table")
}
