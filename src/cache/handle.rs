//! Shared Cache Handle
//!
//! `Cache` is the cloneable handle callers hold. It owns the store behind a
//! single `RwLock` and forwards writes to the remote mirror after the lock
//! is released.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::cache::compression::{Compressor, Lz4Compressor};
use crate::cache::{
    CacheConfig, CacheConfigUpdate, CacheEntry, CacheStats, CacheStore, CacheValue, SetOptions,
};
use crate::error::Result;
use crate::mirror::{LoggingMirror, MirrorDispatcher, MirrorOp, RemoteMirror};

// == Maintenance Report ==
/// Outcome of one maintenance run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaintenanceReport {
    pub expired_removed: usize,
    pub stats: CacheStats,
}

// == Cache Builder ==
/// Builds a [`Cache`] with non-default codec or mirror.
pub struct CacheBuilder {
    config: CacheConfig,
    compressor: Arc<dyn Compressor>,
    mirror: Arc<dyn RemoteMirror>,
}

impl CacheBuilder {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            compressor: Arc::new(Lz4Compressor::new()),
            mirror: Arc::new(LoggingMirror),
        }
    }

    pub fn compressor(mut self, compressor: Arc<dyn Compressor>) -> Self {
        self.compressor = compressor;
        self
    }

    pub fn mirror(mut self, mirror: Arc<dyn RemoteMirror>) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn build<T: CacheValue>(self) -> Result<Cache<T>> {
        let store = CacheStore::new(self.config, self.compressor)?;
        Ok(Cache {
            store: Arc::new(RwLock::new(store)),
            mirror: MirrorDispatcher::new(self.mirror),
        })
    }
}

// == Cache ==
/// Thread-safe cache handle. Clones share the same store.
pub struct Cache<T> {
    store: Arc<RwLock<CacheStore<T>>>,
    mirror: MirrorDispatcher,
}

impl<T> Clone for Cache<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            mirror: self.mirror.clone(),
        }
    }
}

/// Endpoint and deadline for a mirror call, captured under the lock.
struct MirrorTarget {
    endpoint: String,
    timeout: Duration,
}

impl MirrorTarget {
    fn from_config(config: &CacheConfig) -> Option<Self> {
        if !config.mirror_active() {
            return None;
        }
        config.remote_mirror_endpoint.clone().map(|endpoint| Self {
            endpoint,
            timeout: Duration::from_millis(config.mirror_timeout_ms),
        })
    }
}

impl<T: CacheValue> Cache<T> {
    /// Cache with the LZ4 codec and the logging mirror.
    pub fn new(config: CacheConfig) -> Result<Self> {
        CacheBuilder::new(config).build()
    }

    pub fn builder(config: CacheConfig) -> CacheBuilder {
        CacheBuilder::new(config)
    }

    /// Merges a partial config and returns the resulting one.
    pub async fn configure(&self, update: CacheConfigUpdate) -> Result<CacheConfig> {
        self.store.write().await.configure(&update)
    }

    pub async fn config(&self) -> CacheConfig {
        self.store.read().await.config().clone()
    }

    // == Set ==
    /// Inserts or replaces `key`, then mirrors the value when enabled.
    pub async fn set(&self, key: impl Into<String>, value: T, options: SetOptions) -> Result<()> {
        let key = key.into();

        let mirrored = {
            let mut store = self.store.write().await;
            let copy = MirrorTarget::from_config(store.config())
                .map(|target| (target, value.clone()));
            store.set(key.clone(), value, options)?;
            copy
        };

        // Serialized outside the lock
        if let Some((target, value)) = mirrored {
            match serde_json::to_value(&value) {
                Ok(value) => {
                    self.mirror
                        .dispatch(target.endpoint, MirrorOp::Update { key, value }, target.timeout);
                }
                Err(e) => warn!("Skipping remote mirror for '{}': {}", key, e),
            }
        }
        Ok(())
    }

    // == Get ==
    /// Returns a copy of the live value, or `None` when absent or expired.
    pub async fn get(&self, key: &str) -> Option<T> {
        // Write lock: hits update access metadata and lazy expiry removes
        self.store.write().await.get(key)
    }

    // == Delete ==
    pub async fn delete(&self, key: &str) -> bool {
        let (removed, target) = {
            let mut store = self.store.write().await;
            let removed = store.delete(key);
            (removed, MirrorTarget::from_config(store.config()))
        };

        if let (true, Some(target)) = (removed, target) {
            self.mirror.dispatch(
                target.endpoint,
                MirrorOp::Remove {
                    key: key.to_string(),
                },
                target.timeout,
            );
        }
        removed
    }

    pub async fn invalidate_by_tags<I, S>(&self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.store.write().await.invalidate_by_tags(tags)
    }

    /// Diagnostics lookup by key regex; O(n) in the number of entries.
    pub async fn get_by_pattern(&self, pattern: &str) -> Result<Vec<CacheEntry<T>>> {
        self.store.read().await.get_by_pattern(pattern)
    }

    /// Drops every entry and returns how many were removed.
    pub async fn clear(&self) -> usize {
        let (removed, target) = {
            let mut store = self.store.write().await;
            let removed = store.clear();
            (removed, MirrorTarget::from_config(store.config()))
        };

        if let Some(target) = target {
            self.mirror
                .dispatch(target.endpoint, MirrorOp::Clear, target.timeout);
        }
        removed
    }

    pub async fn reset_stats(&self) {
        self.store.write().await.reset_stats();
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    // == Maintenance ==
    /// Sweeps expired entries and logs a statistics snapshot.
    pub async fn run_maintenance(&self) -> MaintenanceReport {
        let (expired_removed, stats) = {
            let mut store = self.store.write().await;
            let removed = store.cleanup_expired();
            (removed, store.stats())
        };

        if expired_removed > 0 {
            info!("Cache maintenance removed {} expired entries", expired_removed);
        }
        info!(
            "Cache statistics: size={}, hit_rate={:.2}%, avg_response_time={:.2}ms, evictions={}",
            stats.current_size, stats.hit_rate_percent, stats.avg_response_time_ms, stats.evictions
        );

        MaintenanceReport {
            expired_removed,
            stats,
        }
    }

    pub(crate) async fn record_warmup(&self, success: bool) {
        self.store.write().await.record_warmup(success);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::compression::NoopCompressor;
    use crate::cache::{EvictionStrategy, Priority};
    use crate::mirror::testing::RecordingMirror;

    fn mirrored_config() -> CacheConfig {
        CacheConfig {
            enable_remote_mirror: true,
            remote_mirror_endpoint: Some("https://cdn.example.com".to_string()),
            ..CacheConfig::default()
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    /// Value whose serialization blocks the calling thread.
    #[derive(Clone, serde::Deserialize)]
    struct SlowValue(u32);

    impl serde::Serialize for SlowValue {
        fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            std::thread::sleep(Duration::from_millis(300));
            serializer.serialize_u32(self.0)
        }
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache: Cache<u32> = Cache::new(CacheConfig::default()).unwrap();

        cache.set("a", 1, SetOptions::new()).await.unwrap();
        assert_eq!(cache.get("a").await, Some(1));
        assert!(cache.delete("a").await);
        assert!(!cache.delete("a").await);
        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test]
    async fn test_clones_share_store() {
        let cache: Cache<String> = Cache::new(CacheConfig::default()).unwrap();
        let other = cache.clone();

        cache.set("k", "v".to_string(), SetOptions::new()).await.unwrap();
        assert_eq!(other.get("k").await, Some("v".to_string()));
        assert_eq!(other.len().await, 1);
    }

    #[tokio::test]
    async fn test_configure_changes_strategy() {
        let cache: Cache<u32> = Cache::new(CacheConfig::default()).unwrap();
        let config = cache
            .configure(CacheConfigUpdate {
                eviction_strategy: Some(EvictionStrategy::Ttl),
                ..CacheConfigUpdate::default()
            })
            .await
            .unwrap();

        assert_eq!(config.eviction_strategy, EvictionStrategy::Ttl);
        assert_eq!(cache.config().await.eviction_strategy, EvictionStrategy::Ttl);
    }

    #[tokio::test]
    async fn test_mirror_receives_writes() {
        let mirror = Arc::new(RecordingMirror::default());
        let cache: Cache<u32> = Cache::<u32>::builder(mirrored_config())
            .mirror(mirror.clone())
            .build()
            .unwrap();

        cache.set("a", 1, SetOptions::new()).await.unwrap();
        cache.delete("a").await;
        cache.delete("a").await;
        cache.clear().await;
        settle().await;

        let mut calls = mirror.calls();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                "clear https://cdn.example.com".to_string(),
                "remove https://cdn.example.com a".to_string(),
                "update https://cdn.example.com a".to_string(),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_mirror_payload_serialized_outside_lock() {
        let cache: Cache<SlowValue> = Cache::<SlowValue>::builder(mirrored_config())
            .mirror(Arc::new(RecordingMirror::default()))
            .build()
            .unwrap();

        let writer = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.set("slow", SlowValue(1), SetOptions::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = std::time::Instant::now();
        assert_eq!(cache.len().await, 1);
        assert!(started.elapsed() < Duration::from_millis(200));

        writer.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_mirror_failure_does_not_fail_set() {
        let mirror = Arc::new(RecordingMirror {
            failing: true,
            ..RecordingMirror::default()
        });
        let cache: Cache<u32> = Cache::<u32>::builder(mirrored_config())
            .mirror(mirror.clone())
            .build()
            .unwrap();

        assert!(cache.set("a", 1, SetOptions::new()).await.is_ok());
        assert!(cache.delete("a").await);
        settle().await;

        assert_eq!(mirror.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_mirror_disabled_without_endpoint() {
        let mirror = Arc::new(RecordingMirror::default());
        let config = CacheConfig {
            enable_remote_mirror: true,
            ..CacheConfig::default()
        };
        let cache: Cache<u32> = Cache::<u32>::builder(config).mirror(mirror.clone()).build().unwrap();

        cache.set("a", 1, SetOptions::new()).await.unwrap();
        settle().await;

        assert!(mirror.calls().is_empty());
    }

    #[tokio::test]
    async fn test_custom_compressor() {
        let cache: Cache<Vec<u32>> = Cache::<Vec<u32>>::builder(CacheConfig::default())
            .compressor(Arc::new(NoopCompressor))
            .build()
            .unwrap();

        cache
            .set("nums", vec![1, 2, 3], SetOptions::new().compress(true))
            .await
            .unwrap();

        let entries = cache.get_by_pattern("nums").await.unwrap();
        assert!(entries[0].compressed);
        assert_eq!(cache.get("nums").await, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_run_maintenance_reports_sweep() {
        let cache: Cache<u32> = Cache::new(CacheConfig::default()).unwrap();
        cache.set("short", 1, SetOptions::new().ttl(1)).await.unwrap();
        cache
            .set("long", 2, SetOptions::new().priority(Priority::High))
            .await
            .unwrap();
        cache
            .store
            .write()
            .await
            .backdate("short", chrono::Duration::seconds(5));

        let report = cache.run_maintenance().await;

        assert_eq!(report.expired_removed, 1);
        assert_eq!(report.stats.current_size, 1);
        assert_eq!(report.stats.expired_removals, 1);
        // Sweeps are not lookups
        assert_eq!(report.stats.misses, 0);
    }

    #[tokio::test]
    async fn test_clear_and_reset_stats() {
        let cache: Cache<u32> = Cache::new(CacheConfig::default()).unwrap();
        cache.set("a", 1, SetOptions::new()).await.unwrap();
        cache.get("a").await;

        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.stats().await.hits, 1);

        cache.reset_stats().await;
        assert_eq!(cache.stats().await, CacheStats::new());
    }
}
