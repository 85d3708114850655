//! API Module
//!
//! HTTP handlers and routing for the cache diagnostics surface.
//!
//! # Endpoints
//! - `PUT /entries`, `GET /entries?pattern=`, `DELETE /entries`
//! - `GET /entries/:key`, `DELETE /entries/:key`
//! - `POST /invalidate`, `POST /preload`
//! - `PATCH /config`
//! - `GET /stats`, `GET /health`

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
