//! Configuration Module
//!
//! Loads host process configuration from environment variables. The cache
//! itself never reads the environment; it receives a [`CacheConfig`] built
//! here.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, EvictionStrategy};

/// Host process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maintenance sweep interval in seconds
    pub maintenance_interval: u64,
    /// Settings handed to the cache at construction
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAINTENANCE_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_EVICTION_STRATEGY` - `lru`, `ttl` or `hybrid` (default: hybrid)
    /// - `CACHE_ENABLE_COMPRESSION` - `true`/`false` (default: true)
    /// - `CACHE_WARMUP_ENABLED` - `true`/`false` (default: true)
    /// - `CACHE_REMOTE_MIRROR_ENDPOINT` - Enables the remote mirror when set
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = CacheConfig::default();
        let remote_mirror_endpoint = env::var("CACHE_REMOTE_MIRROR_ENDPOINT")
            .ok()
            .filter(|v| !v.trim().is_empty());

        Self {
            server_port: parse_env("SERVER_PORT").unwrap_or(3000),
            maintenance_interval: parse_env("MAINTENANCE_INTERVAL").unwrap_or(300),
            cache: CacheConfig {
                default_ttl_seconds: parse_env("CACHE_DEFAULT_TTL")
                    .unwrap_or(defaults.default_ttl_seconds),
                max_size: parse_env("CACHE_MAX_SIZE")
                    .filter(|size| *size > 0)
                    .unwrap_or(defaults.max_size),
                enable_compression: parse_env("CACHE_ENABLE_COMPRESSION")
                    .unwrap_or(defaults.enable_compression),
                warmup_enabled: parse_env("CACHE_WARMUP_ENABLED")
                    .unwrap_or(defaults.warmup_enabled),
                eviction_strategy: parse_env::<EvictionStrategy>("CACHE_EVICTION_STRATEGY")
                    .unwrap_or(defaults.eviction_strategy),
                enable_remote_mirror: remote_mirror_endpoint.is_some(),
                remote_mirror_endpoint,
                ..defaults
            },
        }
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            maintenance_interval: 300,
            cache: CacheConfig::default(),
        }
    }
}

fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
