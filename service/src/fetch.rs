//! JSON fetching, caching, and proxying
//!
//! All external metadata arrives through the [`JsonFetcher`] trait so
//! that loaders and references never talk to `reqwest` directly and
//! tests can substitute an in-memory fetcher. The caching wrapper is
//! keyed by URL with a caller-specified freshness window; invalidation
//! is purely time-based.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use parking_lot::Mutex;
use serde_json::Value as JsonValue;
use tracing::debug;

use geocatalog_core::config::{CacheConfig, NetworkConfig, ProxyConfig};
use geocatalog_core::{CatalogError, Result};

/// Asynchronous JSON source
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Fetch and parse a JSON document
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Fetch`] for transport failures and
    /// [`CatalogError::Parse`] for malformed bodies.
    async fn fetch_json(&self, url: &str) -> Result<JsonValue>;
}

/// HTTP-backed fetcher
pub struct HttpJsonFetcher {
    client: reqwest::Client,
}

impl HttpJsonFetcher {
    /// Build a fetcher from the network configuration
    ///
    /// # Errors
    ///
    /// Fails when the HTTP client cannot be constructed.
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(StdDuration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| CatalogError::config(format!("http client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonFetcher for HttpJsonFetcher {
    async fn fetch_json(&self, url: &str) -> Result<JsonValue> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::fetch(url, e.to_string()))?;
        let response = response
            .error_for_status()
            .map_err(|e| CatalogError::fetch(url, e.to_string()))?;
        response
            .json::<JsonValue>()
            .await
            .map_err(|e| CatalogError::parse_at(e.to_string(), url))
    }
}

struct CachedResponse {
    fetched_at: DateTime<Utc>,
    value: JsonValue,
}

/// URL-keyed caching wrapper around any [`JsonFetcher`]
pub struct CachingFetcher {
    inner: Arc<dyn JsonFetcher>,
    cache: Mutex<LruCache<String, CachedResponse>>,
    default_max_age: Duration,
}

impl CachingFetcher {
    /// Wrap a fetcher with an LRU response cache
    #[must_use]
    pub fn new(inner: Arc<dyn JsonFetcher>, config: &CacheConfig) -> Self {
        let capacity =
            NonZeroUsize::new(config.max_entries.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            default_max_age: Duration::seconds(
                i64::try_from(config.default_max_age_seconds).unwrap_or(i64::MAX),
            ),
        }
    }

    /// Fetch through the cache with an explicit freshness window
    ///
    /// A cached response older than `max_age` is refetched; two
    /// concurrent misses for the same URL both fetch and the later
    /// write wins, which is safe because installation is
    /// last-write-wins everywhere downstream.
    ///
    /// # Errors
    ///
    /// Propagates the inner fetcher's errors on a miss.
    pub async fn fetch_json_cached(&self, url: &str, max_age: Duration) -> Result<JsonValue> {
        let now = Utc::now();
        {
            let mut cache = self.cache.lock();
            if let Some(entry) = cache.get(url) {
                if now - entry.fetched_at <= max_age {
                    return Ok(entry.value.clone());
                }
                debug!(url, "cached response stale, refetching");
            }
        }

        let value = self.inner.fetch_json(url).await?;
        self.cache.lock().put(
            url.to_string(),
            CachedResponse {
                fetched_at: now,
                value: value.clone(),
            },
        );
        Ok(value)
    }
}

#[async_trait]
impl JsonFetcher for CachingFetcher {
    async fn fetch_json(&self, url: &str) -> Result<JsonValue> {
        self.fetch_json_cached(url, self.default_max_age).await
    }
}

/// Rewrite a URL through the configured CORS proxy
///
/// Returns `{base}/_{duration}/{url}` when a proxy base is configured,
/// the input URL unchanged otherwise. `cache_duration` is a compact
/// duration string such as `1d` or `30m`, honored by the proxy.
#[must_use]
pub fn proxy_url(proxy: &ProxyConfig, url: &str, cache_duration: &str) -> String {
    match &proxy.base_url {
        Some(base) => {
            let base = base.trim_end_matches('/');
            format!("{base}/_{cache_duration}/{url}")
        }
        None => url.to_string(),
    }
}

/// Freshness window for a compact cache-duration string
///
/// The same string feeds [`proxy_url`], keeping the local cache and
/// the proxy's cache in agreement. Unparseable strings fall back to
/// one day.
#[must_use]
pub fn cache_window(spec: &str) -> Duration {
    parse_cache_duration(spec).unwrap_or_else(|| Duration::days(1))
}

/// Parse a compact cache-duration string (`30s`, `10m`, `6h`, `1d`)
#[must_use]
pub fn parse_cache_duration(spec: &str) -> Option<Duration> {
    let (digits, unit) = spec.split_at(spec.len().checked_sub(1)?);
    let amount: i64 = digits.parse().ok()?;
    match unit {
        "s" => Some(Duration::seconds(amount)),
        "m" => Some(Duration::minutes(amount)),
        "h" => Some(Duration::hours(amount)),
        "d" => Some(Duration::days(amount)),
        _ => None,
    }
}
