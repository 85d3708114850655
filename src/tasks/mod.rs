//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Maintenance: sweeps expired entries and logs statistics at a fixed interval

mod maintenance;

pub use maintenance::{spawn_maintenance_task, MaintenanceHandle};
