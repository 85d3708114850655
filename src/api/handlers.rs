//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. Handlers are thin:
//! validation and status mapping live here, every cache rule lives in
//! [`Cache`].

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{Cache, CacheConfig, CacheConfigUpdate, CacheStats, PreloadReport};
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, DeleteResponse, EntriesResponse, GetResponse, HealthResponse,
    InvalidateRequest, InvalidateResponse, PatternQuery, PreloadRequest, SetRequest, SetResponse,
};

/// Application state shared across all handlers.
///
/// [`Cache`] is already a cheap, cloneable handle around its own lock.
#[derive(Clone)]
pub struct AppState {
    pub cache: Cache<Value>,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: Cache<Value>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Ok(Self::new(Cache::new(config.cache.clone())?))
    }
}

/// Handler for PUT /entries
///
/// Stores a JSON value with optional TTL, tags, priority and compression.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let (key, value, options) = req.into_parts();
    state.cache.set(key.as_str(), value, options).await?;

    Ok(Json(SetResponse::new(key)))
}

/// Handler for GET /entries/:key
///
/// Misses and expired entries both map to 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.cache.get(&key).await {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /entries/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    let deleted = state.cache.delete(&key).await;
    Json(DeleteResponse::new(key, deleted))
}

/// Handler for GET /entries?pattern=
///
/// Lists entry snapshots whose key matches the regex.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(query): Query<PatternQuery>,
) -> Result<Json<EntriesResponse>> {
    let entries = state.cache.get_by_pattern(query.pattern()).await?;
    Ok(Json(EntriesResponse::new(entries)))
}

/// Handler for DELETE /entries
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let removed = state.cache.clear().await;
    Json(ClearResponse { removed })
}

/// Handler for POST /invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Json<InvalidateResponse> {
    let invalidated = state.cache.invalidate_by_tags(&req.tags).await;
    Json(InvalidateResponse { invalidated })
}

/// Handler for POST /preload
///
/// The batch is rejected up front if any key breaks the SET key rules.
pub async fn preload_handler(
    State(state): State<AppState>,
    Json(req): Json<PreloadRequest>,
) -> Result<Json<PreloadReport>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    Ok(Json(state.cache.preload(req.entries).await))
}

/// Handler for PATCH /config
///
/// Applies a partial update and returns the resulting configuration.
pub async fn config_handler(
    State(state): State<AppState>,
    Json(update): Json<CacheConfigUpdate>,
) -> Result<Json<CacheConfig>> {
    let config = state.cache.configure(update).await?;
    Ok(Json(config))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats().await)
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.len().await))
}
