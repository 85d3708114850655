//! Cache Entry Module
//!
//! Defines stored entries, their metadata, and the read-only snapshots
//! handed out to callers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::compression::Compressor;
use crate::cache::CacheValue;
use crate::error::{CacheError, Result};

// == Priority ==
/// Retention priority of an entry, weighted by the hybrid eviction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Weight used in the hybrid retention score.
    pub fn weight(self) -> u64 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

// == Set Options ==
/// Per-call options for `set`.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    /// TTL in seconds; `None` or `Some(0)` uses the configured default
    pub ttl: Option<u64>,
    pub tags: Vec<String>,
    pub priority: Priority,
    /// Store compressed when compression is also enabled in the config
    pub compress: bool,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ttl(mut self, seconds: u64) -> Self {
        self.ttl = Some(seconds);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

// == Stored Value ==
/// Payload representation inside the store.
#[derive(Debug, Clone)]
pub(crate) enum StoredValue<T> {
    Plain(T),
    /// Serialized with serde_json, then run through the store's compressor
    Compressed(Vec<u8>),
}

impl<T: CacheValue> StoredValue<T> {
    /// Serializes and compresses `value`.
    pub(crate) fn compressed(value: &T, compressor: &dyn Compressor) -> Result<Self> {
        let serialized = serde_json::to_vec(value).map_err(|e| CacheError::Compression {
            codec: "json".to_string(),
            reason: e.to_string(),
        })?;
        Ok(StoredValue::Compressed(compressor.compress(&serialized)?))
    }

    /// Returns an owned copy of the payload, decompressing if needed.
    pub(crate) fn decode(&self, compressor: &dyn Compressor) -> Result<T> {
        match self {
            StoredValue::Plain(value) => Ok(value.clone()),
            StoredValue::Compressed(bytes) => {
                let raw = compressor.decompress(bytes)?;
                serde_json::from_slice(&raw).map_err(|e| CacheError::Compression {
                    codec: "json".to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    pub(crate) fn is_compressed(&self) -> bool {
        matches!(self, StoredValue::Compressed(_))
    }
}

// == Stored Entry ==
/// A single entry as owned by the store. Never handed out directly.
#[derive(Debug, Clone)]
pub(crate) struct StoredEntry<T> {
    pub value: StoredValue<T>,
    pub ttl_seconds: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    pub tags: HashSet<String>,
    pub priority: Priority,
    /// Logical clock value of the last insert or hit; breaks timestamp ties
    pub touched: u64,
}

impl<T> StoredEntry<T> {
    pub(crate) fn new(
        value: StoredValue<T>,
        ttl_seconds: u64,
        tags: HashSet<String>,
        priority: Priority,
        now: DateTime<Utc>,
        touched: u64,
    ) -> Self {
        Self {
            value,
            ttl_seconds,
            created_at: now,
            last_accessed: now,
            access_count: 0,
            tags,
            priority,
            touched,
        }
    }

    /// Records a successful lookup.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>, touched: u64) {
        // Wall clock may step backwards; keep last_accessed >= created_at
        self.last_accessed = now.max(self.created_at);
        self.access_count += 1;
        self.touched = touched;
    }
}

// == Cache Entry ==
/// Read-only copy of an entry, returned by pattern lookups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry<T> {
    pub key: String,
    pub value: T,
    pub ttl_seconds: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
    pub tags: Vec<String>,
    pub priority: Priority,
    pub compressed: bool,
}

impl<T: CacheValue> CacheEntry<T> {
    pub(crate) fn from_stored(
        key: &str,
        entry: &StoredEntry<T>,
        compressor: &dyn Compressor,
    ) -> Result<Self> {
        let mut tags: Vec<String> = entry.tags.iter().cloned().collect();
        tags.sort();

        Ok(Self {
            key: key.to_string(),
            value: entry.value.decode(compressor)?,
            ttl_seconds: entry.ttl_seconds,
            created_at: entry.created_at,
            last_accessed: entry.last_accessed,
            access_count: entry.access_count,
            tags,
            priority: entry.priority,
            compressed: entry.value.is_compressed(),
        })
    }
}
