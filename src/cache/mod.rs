//! Cache Module
//!
//! In-process cache with lazy TTL expiry, pluggable eviction, tag
//! invalidation, optional value compression and warmup/preload.

pub mod compression;
mod config;
mod entry;
mod eviction;
mod expiry;
mod handle;
mod stats;
mod store;
mod tags;
mod warmup;


use serde::de::DeserializeOwned;
use serde::Serialize;

// Re-export public types
pub use config::{CacheConfig, CacheConfigUpdate};
pub use entry::{CacheEntry, Priority, SetOptions};
pub use eviction::EvictionStrategy;
pub use handle::{Cache, CacheBuilder, MaintenanceReport};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use warmup::{PreloadEntry, PreloadReport, WarmupReport};

/// Bound on cacheable payloads: owned copies are handed out on every hit,
/// and compressed entries go through serde_json.
pub trait CacheValue: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}
