//! Content Cache - an in-process cache and eviction engine
//!
//! Key/value cache with lazy TTL expiry, LRU/TTL/hybrid eviction, tag
//! invalidation, optional LZ4 compression, warmup/preload and a best-effort
//! remote mirror. A small axum surface exposes it for diagnostics.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod mirror;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheConfig, CacheStats, EvictionStrategy, Priority, SetOptions};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::{spawn_maintenance_task, MaintenanceHandle};
