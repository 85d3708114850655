//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, config_handler, delete_handler, get_handler, health_handler,
    invalidate_handler, list_handler, preload_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /entries` - Store a value
/// - `GET /entries?pattern=` - List entries whose key matches a regex
/// - `DELETE /entries` - Clear the cache
/// - `GET /entries/:key` - Retrieve a value by key
/// - `DELETE /entries/:key` - Delete a key
/// - `POST /invalidate` - Remove every entry carrying one of the tags
/// - `POST /preload` - Bulk-load pre-computed values
/// - `PATCH /config` - Update cache configuration at runtime
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/entries",
            put(set_handler).get(list_handler).delete(clear_handler),
        )
        .route("/entries/:key", get(get_handler).delete(delete_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/preload", post(preload_handler))
        .route("/config", patch(config_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
