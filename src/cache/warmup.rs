//! Warmup and Preload
//!
//! Batch population of the cache outside the request path. Both pipelines
//! tolerate partial failure: a bad key is logged and counted, the rest of
//! the batch carries on.

use std::future::Future;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{Cache, CacheValue, Priority, SetOptions};

/// Outcome of a warmup batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarmupReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Keys never dispatched (warmup disabled or batch cancelled)
    pub skipped: usize,
}

/// Pre-computed value for `preload`.
#[derive(Debug, Clone, Deserialize)]
pub struct PreloadEntry<T> {
    pub key: String,
    pub value: T,
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl<T> PreloadEntry<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, seconds: u64) -> Self {
        self.ttl = Some(seconds);
        self
    }
}

/// Outcome of a preload batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: usize,
}

impl<T: CacheValue> Cache<T> {
    // == Warmup ==
    /// Fetches every key from `provider` and stores the results with high
    /// priority. See [`Cache::warmup_with_cancel`].
    pub async fn warmup<F, Fut>(&self, keys: Vec<String>, provider: F) -> WarmupReport
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        self.warmup_with_cancel(keys, provider, &CancellationToken::new())
            .await
    }

    /// Warmup that stops dispatching new keys once `cancel` fires.
    ///
    /// Up to `warmup_concurrency` provider calls run at once. Calls already
    /// started when the token is cancelled are allowed to finish.
    pub async fn warmup_with_cancel<F, Fut>(
        &self,
        keys: Vec<String>,
        provider: F,
        cancel: &CancellationToken,
    ) -> WarmupReport
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let total = keys.len();
        let config = self.config().await;
        if !config.warmup_enabled {
            debug!("Cache warmup disabled, skipping {} keys", total);
            return WarmupReport {
                skipped: total,
                ..WarmupReport::default()
            };
        }

        info!("Starting cache warmup for {} keys", total);
        let provider = &provider;

        let outcomes: Vec<bool> = stream::iter(keys)
            .take_while(|_| futures::future::ready(!cancel.is_cancelled()))
            .map(|key| async move { self.warm_key(key, provider).await })
            .buffer_unordered(config.warmup_concurrency)
            .collect()
            .await;

        let succeeded = outcomes.iter().filter(|ok| **ok).count();
        let report = WarmupReport {
            succeeded,
            failed: outcomes.len() - succeeded,
            skipped: total - outcomes.len(),
        };

        info!(
            "Cache warmup completed: succeeded={}, failed={}, skipped={}",
            report.succeeded, report.failed, report.skipped
        );
        report
    }

    async fn warm_key<F, Fut>(&self, key: String, provider: &F) -> bool
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        let outcome = match provider(key.clone()).await {
            Ok(value) => self
                .set(key.as_str(), value, SetOptions::new().priority(Priority::High))
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };

        let success = match outcome {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache warmup failed for key '{}': {:#}", key, e);
                false
            }
        };
        self.record_warmup(success).await;
        success
    }

    // == Preload ==
    /// Writes pre-computed values, continuing past entries that fail.
    pub async fn preload(&self, entries: Vec<PreloadEntry<T>>) -> PreloadReport {
        info!("Starting cache preload of {} entries", entries.len());
        let mut report = PreloadReport::default();

        for PreloadEntry { key, value, ttl } in entries {
            let options = SetOptions {
                ttl,
                ..SetOptions::default()
            };
            match self.set(key.as_str(), value, options).await {
                Ok(()) => report.loaded += 1,
                Err(e) => {
                    warn!("Failed to preload cache entry '{}': {}", key, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Cache preload completed: loaded={}, failed={}",
            report.loaded, report.failed
        );
        report
    }
}
