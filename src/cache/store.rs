//! Cache Store Module
//!
//! Lock-owned core of the cache: entry map, tag index and statistics.
//! All methods are synchronous; `Cache` wraps the store in a lock.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::cache::compression::Compressor;
use crate::cache::entry::{SetOptions, StoredEntry, StoredValue};
use crate::cache::tags::TagIndex;
use crate::cache::{
    eviction, expiry, CacheConfig, CacheConfigUpdate, CacheEntry, CacheStats, CacheValue,
};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Entry storage with TTL expiry, capacity eviction and tag invalidation.
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, StoredEntry<T>>,
    /// Tag to keys lookup
    tags: TagIndex,
    /// Performance statistics
    stats: CacheStats,
    config: CacheConfig,
    compressor: Arc<dyn Compressor>,
    /// Logical clock bumped on every insert and hit
    clock: u64,
}

impl<T> fmt::Debug for CacheStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.entries.len())
            .field("config", &self.config)
            .field("compressor", &self.compressor.name())
            .finish()
    }
}

impl<T: CacheValue> CacheStore<T> {
    // == Constructor ==
    /// Creates an empty store after validating `config`.
    pub fn new(config: CacheConfig, compressor: Arc<dyn Compressor>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            entries: HashMap::new(),
            tags: TagIndex::new(),
            stats: CacheStats::new(),
            config,
            compressor,
            clock: 0,
        })
    }

    // == Set ==
    /// Inserts or fully replaces the entry for `key`.
    ///
    /// When inserting a new key into a full store, an eviction pass runs
    /// first, so the store never holds more than `max_size` entries.
    /// Serialization or compression failures are returned as
    /// [`CacheError::Write`] and leave any previous entry untouched.
    pub fn set(&mut self, key: String, value: T, options: SetOptions) -> Result<()> {
        let started = Instant::now();

        let stored = if options.compress && self.config.enable_compression {
            StoredValue::compressed(&value, self.compressor.as_ref()).map_err(|e| {
                error!("Failed to encode cache entry '{}': {}", key, e);
                CacheError::Write {
                    key: key.clone(),
                    reason: e.to_string(),
                }
            })?
        } else {
            StoredValue::Plain(value)
        };

        let ttl_seconds = match options.ttl {
            Some(ttl) if ttl > 0 => ttl,
            _ => self.config.default_ttl_seconds,
        };
        let now = Utc::now();

        // Replacing a key never needs room
        self.remove_entry(&key);
        if self.entries.len() >= self.config.max_size {
            self.evict(now);
        }

        let tags: HashSet<String> = options.tags.into_iter().collect();
        self.tags.insert(&key, &tags);
        debug!(
            "Cache entry set: key={}, ttl={}s, tags={:?}, priority={:?}",
            key, ttl_seconds, tags, options.priority
        );

        let touched = self.tick();
        let entry = StoredEntry::new(stored, ttl_seconds, tags, options.priority, now, touched);
        self.entries.insert(key, entry);

        self.stats.set_current_size(self.entries.len());
        self.stats.record_response_time(started.elapsed());
        Ok(())
    }

    // == Get ==
    /// Returns a copy of the value for `key`.
    ///
    /// Missing and expired keys are misses; an expired entry found here is
    /// removed on the spot.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let started = Instant::now();
        let value = self.lookup(key, Utc::now());

        if value.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        self.stats.record_response_time(started.elapsed());
        value
    }

    fn lookup(&mut self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let expired = expiry::is_expired(self.entries.get(key)?, now);
        if expired {
            self.remove_entry(key);
            self.stats.record_expired(1);
            debug!("Cache entry expired on lookup: {}", key);
            return None;
        }

        let touched = self.tick();
        let entry = self.entries.get_mut(key)?;
        entry.touch(now, touched);

        match entry.value.decode(self.compressor.as_ref()) {
            Ok(value) => Some(value),
            Err(e) => {
                error!("Dropping undecodable cache entry '{}': {}", key, e);
                self.remove_entry(key);
                None
            }
        }
    }

    // == Delete ==
    /// Removes `key`; returns whether an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key).is_some();
        if removed {
            debug!("Cache entry deleted: {}", key);
        }
        removed
    }

    // == Invalidate By Tags ==
    /// Removes every entry carrying any of `tags`; returns how many.
    pub fn invalidate_by_tags<I, S>(&mut self, tags: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: Vec<String> = tags.into_iter().map(|t| t.as_ref().to_string()).collect();
        let keys = self.tags.keys_for(tags.iter().map(String::as_str));

        let mut removed = 0;
        for key in &keys {
            if self.remove_entry(key).is_some() {
                removed += 1;
            }
        }

        info!("Invalidated {} cache entries by tags {:?}", removed, tags);
        removed
    }

    // == Get By Pattern ==
    /// Returns snapshots of live entries whose key matches the regex
    /// `pattern`, sorted by key. Scans every entry and does not count as
    /// an access.
    pub fn get_by_pattern(&self, pattern: &str) -> Result<Vec<CacheEntry<T>>> {
        let regex = Regex::new(pattern).map_err(|e| CacheError::InvalidPattern(e.to_string()))?;
        let now = Utc::now();

        let mut matches: Vec<CacheEntry<T>> = self
            .entries
            .iter()
            .filter(|(key, entry)| {
                regex.is_match(key.as_str()) && !expiry::is_expired(*entry, now)
            })
            .filter_map(|(key, entry)| {
                match CacheEntry::from_stored(key, entry, self.compressor.as_ref()) {
                    Ok(snapshot) => Some(snapshot),
                    Err(e) => {
                        warn!("Skipping undecodable cache entry '{}': {}", key, e);
                        None
                    }
                }
            })
            .collect();

        matches.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(matches)
    }

    // == Clear ==
    /// Empties the store; hit/miss counters are kept. Returns the
    /// previous size.
    pub fn clear(&mut self) -> usize {
        let previous = self.entries.len();
        self.entries.clear();
        self.tags.clear();
        self.stats.set_current_size(0);
        info!("Cache cleared, {} entries dropped", previous);
        previous
    }

    /// Zeroes all statistics counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
        self.stats.set_current_size(self.entries.len());
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Utc::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| expiry::is_expired(*entry, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove_entry(key);
        }

        self.stats.record_expired(expired_keys.len());
        expired_keys.len()
    }

    // == Configure ==
    /// Merges `update` into the config. A lowered `max_size` is enforced
    /// immediately.
    pub fn configure(&mut self, update: &CacheConfigUpdate) -> Result<CacheConfig> {
        let next = self.config.merged(update);
        next.validate()?;
        self.config = next;
        info!("Cache configuration updated: {:?}", self.config);

        if self.entries.len() > self.config.max_size {
            self.evict(Utc::now());
        }
        Ok(self.config.clone())
    }

    pub(crate) fn record_warmup(&mut self, success: bool) {
        if success {
            self.stats.record_warmup_success();
        } else {
            self.stats.record_warmup_failure();
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_current_size(self.entries.len());
        stats
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Eviction ==
    /// Shrinks the store to 80% of `max_size` using the configured strategy.
    fn evict(&mut self, now: DateTime<Utc>) {
        let target = eviction::target_size(self.config.max_size);
        let excess = self.entries.len().saturating_sub(target);
        if excess == 0 {
            return;
        }

        let strategy = self.config.eviction_strategy;
        let victims: Vec<String> = eviction::eviction_order(&self.entries, strategy, now)
            .into_iter()
            .take(excess)
            .collect();

        for key in &victims {
            self.remove_entry(key);
        }

        self.stats.record_evictions(victims.len());
        info!(
            "Evicted {} cache entries ({} strategy), {} remaining",
            victims.len(),
            strategy,
            self.entries.len()
        );
    }

    /// Single removal path; keeps the tag index and size in sync.
    fn remove_entry(&mut self, key: &str) -> Option<StoredEntry<T>> {
        let entry = self.entries.remove(key)?;
        self.tags.remove(key, &entry.tags);
        self.stats.set_current_size(self.entries.len());
        Some(entry)
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    #[cfg(test)]
    pub(crate) fn backdate(&mut self, key: &str, by: chrono::Duration) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.created_at -= by;
            entry.last_accessed -= by;
        }
    }
}
