// crates/server/src/routes/mod.rs
//! API route handlers for the weather collector server.

pub mod health;
pub mod metrics;
pub mod openapi;
pub mod weather;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Create the combined API router.
///
/// Routes:
/// - POST /weather/ - Start a collection job for a user
/// - GET  /weather/{user_id} - Progress and results for a user's job
/// - GET  /health - Health check
/// - GET  /metrics - Prometheus metrics
/// - GET  /api-docs/openapi.json - OpenAPI document (Swagger UI at /swagger-ui)
pub fn api_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(weather::router())
        .merge(health::router())
        .merge(metrics::router())
        .merge(openapi::router())
        .with_state(state)
}
