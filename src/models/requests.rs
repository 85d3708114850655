//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::{PreloadEntry, Priority, SetOptions};

/// Maximum key length accepted over HTTP, in bytes. The cache itself
/// takes any key.
pub const MAX_KEY_LENGTH: usize = 256;

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    None
}

/// Request body for the SET operation (PUT /entries)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (uses the configured default if absent or 0)
/// - `tags`: Labels used for group invalidation
/// - `priority`: `high`, `medium` or `low`
/// - `compress`: Compress the stored value when compression is enabled
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub compress: bool,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if let Some(error) = validate_key(&self.key) {
            return Some(error);
        }
        if self.tags.iter().any(|tag| tag.is_empty()) {
            return Some("Tags cannot be empty".to_string());
        }
        None
    }

    /// Splits the request into key, value and write options.
    pub fn into_parts(self) -> (String, Value, SetOptions) {
        let options = SetOptions {
            ttl: self.ttl,
            tags: self.tags,
            priority: self.priority,
            compress: self.compress,
        };
        (self.key, self.value, options)
    }
}

/// Request body for tag invalidation (POST /invalidate)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub tags: Vec<String>,
}

/// Request body for bulk preload (POST /preload)
#[derive(Debug, Clone, Deserialize)]
pub struct PreloadRequest {
    pub entries: Vec<PreloadEntry<Value>>,
}

impl PreloadRequest {
    /// Applies the SET key rules to every entry.
    pub fn validate(&self) -> Option<String> {
        self.entries
            .iter()
            .find_map(|entry| validate_key(&entry.key))
    }
}

/// Query string for entry listing (GET /entries?pattern=...)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternQuery {
    /// Regex matched against keys; every entry is listed when absent
    #[serde(default)]
    pub pattern: Option<String>,
}

impl PatternQuery {
    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(".*")
    }
}
