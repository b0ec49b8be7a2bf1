//! HTTP API routes and handlers.
//!
//! Endpoints are organized by domain:
//! - `devices` - Report polling and roster lookups
//! - `config` - Calibration and recency settings
//! - `health` - Service health checks
//! - `error` - API error types
//! - `openapi` - OpenAPI specification generation

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub mod config;
pub mod devices;
pub mod error;
pub mod health;
pub mod openapi;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use openapi::get_openapi_json;

/// Creates the combined API router with all endpoints.
///
/// # Route Structure
///
/// ```text
/// /health                  - Health check
/// /api
/// ├── /devices             - Poll the report, list visible MACs
/// ├── /devices/{mac}       - Display name and attributes of one device
/// ├── /roster              - Every device from the last poll
/// ├── /config              - Configuration and recalibration
/// └── /openapi.json        - OpenAPI specification
/// ```
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest(
            "/api",
            Router::new()
                .route("/devices", get(devices::list_devices))
                .route("/devices/{mac}", get(devices::get_device))
                .route("/roster", get(devices::get_roster))
                .route("/openapi.json", get(openapi::get_openapi_spec))
                .nest("/config", config::router()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
