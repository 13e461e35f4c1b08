// crates/server/src/routes/openapi.rs
//! OpenAPI document for the weather API.
//!
//! - GET /api-docs/openapi.json — OpenAPI 3.1 JSON
//! - GET /swagger-ui            — Swagger UI (with the `swagger` feature)

use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;
use weather_collector_core::CityWeather;

use crate::error::ErrorResponse;
use crate::routes::weather::{ProgressResponse, StartCollectionRequest, StartCollectionResponse};
use crate::state::AppState;

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Open Weather API",
        version = "1.0",
        description = "Collects current weather for a user's cities from OpenWeatherMap"
    ),
    paths(
        crate::routes::weather::start_collection,
        crate::routes::weather::get_progress,
    ),
    components(schemas(
        StartCollectionRequest,
        StartCollectionResponse,
        ProgressResponse,
        CityWeather,
        ErrorResponse,
    )),
    tags((name = "weather", description = "Weather data collection"))
)]
pub struct ApiDoc;

/// Build the docs router.
#[cfg(feature = "swagger")]
pub fn router() -> Router<Arc<AppState>> {
    use utoipa_swagger_ui::SwaggerUi;

    // SwaggerUi also serves the JSON document at OPENAPI_PATH.
    Router::new().merge(SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()))
}

/// Build the docs router.
#[cfg(not(feature = "swagger"))]
pub fn router() -> Router<Arc<AppState>> {
    use axum::routing::get;
    use axum::Json;

    Router::new().route(
        OPENAPI_PATH,
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
