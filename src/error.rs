//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
///
/// Only failures that make a primary operation impossible surface here.
/// Mirror, maintenance and warmup failures are logged and counted instead.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The value could not be serialized or compressed, so `set` was not honored
    #[error("Cache write failed for key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// A compressor rejected its input
    #[error("{codec} codec failed: {reason}")]
    Compression { codec: String, reason: String },

    /// Invalid request data (bad key)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key pattern did not compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key not found in cache (HTTP surface only)
    #[error("Key not found: {0}")]
    NotFound(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_)
            | CacheError::InvalidPattern(_)
            | CacheError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            CacheError::Write { .. } | CacheError::Compression { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
