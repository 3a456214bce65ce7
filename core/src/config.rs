//! Configuration structures for the catalog service

use serde::{Deserialize, Serialize};

/// Main catalog service configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Network configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// CORS proxy configuration
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Network configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// User agent sent with metadata requests
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: "geocatalog/0.1".to_string(),
        }
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Maximum number of cached responses
    pub max_entries: usize,

    /// Freshness window applied when the caller does not specify one,
    /// in seconds
    pub default_max_age_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            default_max_age_seconds: 86_400,
        }
    }
}

/// CORS proxy configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Proxy base URL; requests pass through unmodified when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.network.timeout_ms, 30_000);
        assert_eq!(config.cache.default_max_age_seconds, 86_400);
        assert!(config.proxy.base_url.is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CatalogConfig =
            serde_json::from_str(r#"{"proxy": {"base_url": "https://proxy.example.com"}}"#)
                .expect("valid config");
        assert_eq!(
            config.proxy.base_url.as_deref(),
            Some("https://proxy.example.com")
        );
        assert_eq!(config.cache.max_entries, 256);
    }
}
