//! Cache Configuration
//!
//! Runtime settings of a cache instance and the partial update applied by
//! `configure`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::cache::EvictionStrategy;
use crate::error::{CacheError, Result};

/// Settings of one cache instance, supplied at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL in seconds for entries set without one
    pub default_ttl_seconds: u64,
    /// Maximum number of entries held at once
    pub max_size: usize,
    /// Allows `compress` set options to take effect
    pub enable_compression: bool,
    pub enable_remote_mirror: bool,
    pub remote_mirror_endpoint: Option<String>,
    pub warmup_enabled: bool,
    pub eviction_strategy: EvictionStrategy,
    /// Provider calls in flight during one warmup batch
    pub warmup_concurrency: usize,
    /// Deadline for one mirror call
    pub mirror_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: 3600,
            max_size: 1000,
            enable_compression: true,
            enable_remote_mirror: false,
            remote_mirror_endpoint: None,
            warmup_enabled: true,
            eviction_strategy: EvictionStrategy::Hybrid,
            warmup_concurrency: 16,
            mirror_timeout_ms: 2000,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be at least 1".to_string(),
            ));
        }
        if self.warmup_concurrency == 0 {
            return Err(CacheError::InvalidConfig(
                "warmup_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Mirror calls are only dispatched with the flag on and an endpoint set.
    pub fn mirror_active(&self) -> bool {
        self.enable_remote_mirror && self.remote_mirror_endpoint.is_some()
    }

    /// Returns a copy with `update` merged over it.
    pub fn merged(&self, update: &CacheConfigUpdate) -> Self {
        let mut next = self.clone();
        if let Some(ttl) = update.default_ttl_seconds {
            next.default_ttl_seconds = ttl;
        }
        if let Some(max_size) = update.max_size {
            next.max_size = max_size;
        }
        if let Some(enabled) = update.enable_compression {
            next.enable_compression = enabled;
        }
        if let Some(enabled) = update.enable_remote_mirror {
            next.enable_remote_mirror = enabled;
        }
        if let Some(endpoint) = &update.remote_mirror_endpoint {
            next.remote_mirror_endpoint = endpoint.clone();
        }
        if let Some(enabled) = update.warmup_enabled {
            next.warmup_enabled = enabled;
        }
        if let Some(strategy) = update.eviction_strategy {
            next.eviction_strategy = strategy;
        }
        if let Some(concurrency) = update.warmup_concurrency {
            next.warmup_concurrency = concurrency;
        }
        if let Some(timeout) = update.mirror_timeout_ms {
            next.mirror_timeout_ms = timeout;
        }
        next
    }
}

/// Partial configuration for `configure`; `None` fields are left as is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfigUpdate {
    pub default_ttl_seconds: Option<u64>,
    pub max_size: Option<usize>,
    pub enable_compression: Option<bool>,
    pub enable_remote_mirror: Option<bool>,
    /// `Some(None)` (JSON `null`) removes the endpoint
    #[serde(deserialize_with = "present_or_null")]
    pub remote_mirror_endpoint: Option<Option<String>>,
    pub warmup_enabled: Option<bool>,
    pub eviction_strategy: Option<EvictionStrategy>,
    pub warmup_concurrency: Option<usize>,
    pub mirror_timeout_ms: Option<u64>,
}

/// Maps a present field to `Some`, keeping an explicit `null` apart from
/// an absent field (which `#[serde(default)]` turns into `None`).
fn present_or_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl_seconds, 3600);
        assert_eq!(config.max_size, 1000);
        assert!(config.enable_compression);
        assert!(!config.enable_remote_mirror);
        assert!(config.warmup_enabled);
        assert_eq!(config.eviction_strategy, EvictionStrategy::Hybrid);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = CacheConfig {
            max_size: 0,
            ..CacheConfig::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_merge_only_touches_set_fields() {
        let base = CacheConfig::default();
        let update = CacheConfigUpdate {
            max_size: Some(10),
            eviction_strategy: Some(EvictionStrategy::Lru),
            ..CacheConfigUpdate::default()
        };

        let merged = base.merged(&update);
        assert_eq!(merged.max_size, 10);
        assert_eq!(merged.eviction_strategy, EvictionStrategy::Lru);
        assert_eq!(merged.default_ttl_seconds, base.default_ttl_seconds);
        assert_eq!(merged.enable_compression, base.enable_compression);
    }

    #[test]
    fn test_mirror_needs_endpoint() {
        let mut config = CacheConfig {
            enable_remote_mirror: true,
            ..CacheConfig::default()
        };
        assert!(!config.mirror_active());

        config.remote_mirror_endpoint = Some("https://cdn.example.com".to_string());
        assert!(config.mirror_active());
    }

    #[test]
    fn test_update_can_clear_endpoint() {
        let base = CacheConfig {
            enable_remote_mirror: true,
            remote_mirror_endpoint: Some("https://cdn.example.com".to_string()),
            ..CacheConfig::default()
        };

        let untouched: CacheConfigUpdate = serde_json::from_str(r#"{"max_size": 5}"#).unwrap();
        assert_eq!(untouched.remote_mirror_endpoint, None);
        assert!(base.merged(&untouched).mirror_active());

        let cleared: CacheConfigUpdate =
            serde_json::from_str(r#"{"remote_mirror_endpoint": null}"#).unwrap();
        assert_eq!(cleared.remote_mirror_endpoint, Some(None));
        let merged = base.merged(&cleared);
        assert_eq!(merged.remote_mirror_endpoint, None);
        assert!(!merged.mirror_active());

        let replaced: CacheConfigUpdate =
            serde_json::from_str(r#"{"remote_mirror_endpoint": "https://edge.example.com"}"#)
                .unwrap();
        assert_eq!(
            base.merged(&replaced).remote_mirror_endpoint.as_deref(),
            Some("https://edge.example.com")
        );
    }

    #[test]
    fn test_update_deserializes_partial_json() {
        let update: CacheConfigUpdate =
            serde_json::from_str(r#"{"max_size": 50, "eviction_strategy": "ttl"}"#).unwrap();
        assert_eq!(update.max_size, Some(50));
        assert_eq!(update.eviction_strategy, Some(EvictionStrategy::Ttl));
        assert!(update.default_ttl_seconds.is_none());
    }
}
