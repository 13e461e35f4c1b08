// crates/server/src/routes/weather.rs
//! Weather collection API routes.
//!
//! - POST /weather/           — Start collecting weather for a user's cities
//! - GET  /weather/{user_id}  — Progress and results collected so far

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use weather_collector_core::{CityId, CityWeather};

use crate::config::StartMode;
use crate::error::{ApiError, ApiResult, ErrorResponse};
use crate::jobs::JobRecordView;
use crate::metrics;
use crate::state::AppState;

const REQUIRED_FIELDS: &str = "user_id and city_ids are required";
const STARTED_MESSAGE: &str = "Weather data collection started";

// ============================================================================
// Request / Response Types
// ============================================================================

/// Request body for POST /weather/.
///
/// Both fields are optional at the serde level so that a missing field
/// produces our 400 rather than a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartCollectionRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub city_ids: Option<Vec<CityId>>,
}

impl StartCollectionRequest {
    fn validate(self) -> ApiResult<(String, Vec<CityId>)> {
        match (self.user_id, self.city_ids) {
            (Some(user_id), Some(city_ids))
                if !user_id.is_empty() && !city_ids.is_empty() =>
            {
                Ok((user_id, city_ids))
            }
            _ => Err(ApiError::Validation(REQUIRED_FIELDS.to_string())),
        }
    }
}

/// Response for POST /weather/ (202 Accepted).
#[derive(Debug, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct StartCollectionResponse {
    pub message: String,
    pub user_id: String,
}

/// Response for GET /weather/{user_id}.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[cfg_attr(test, derive(Deserialize))]
pub struct ProgressResponse {
    pub user_id: String,
    /// Job creation time, RFC 3339.
    pub datetime: String,
    pub progress: f64,
    pub total_cities: u32,
    pub completed_cities: u32,
    pub weather_data: Vec<CityWeather>,
}

impl From<JobRecordView> for ProgressResponse {
    fn from(view: JobRecordView) -> Self {
        Self {
            user_id: view.user_id,
            datetime: view.created_at.to_rfc3339(),
            progress: view.progress_percent,
            total_cities: view.total_cities,
            completed_cities: view.completed_cities,
            weather_data: view.results,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /weather/ — Create the job and hand it to the runner.
#[utoipa::path(
    post,
    path = "/weather/",
    tag = "weather",
    request_body = StartCollectionRequest,
    responses(
        (status = 202, description = "Weather data collection started", body = StartCollectionResponse),
        (status = 400, description = "Missing fields, malformed body or duplicate user_id", body = ErrorResponse),
    )
)]
pub async fn start_collection(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StartCollectionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<StartCollectionResponse>)> {
    let Json(body) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;
    let (user_id, city_ids) = body.validate()?;
    let total_cities = u32::try_from(city_ids.len())
        .map_err(|_| ApiError::Validation("too many city_ids".to_string()))?;

    state
        .store
        .create_job(&user_id, total_cities, state.clock.now())?;
    metrics::record_job_started();

    tracing::info!(
        user_id = %user_id,
        total_cities,
        start_mode = ?state.start_mode,
        pacer = state.runner.pacer_name(),
        "Weather collection accepted"
    );

    match state.start_mode {
        StartMode::Background => {
            state.runner.spawn(user_id.clone(), city_ids);
        }
        StartMode::Blocking => {
            // The run lives on its own task so a dropped request cannot cut it short.
            if let Err(e) = state.runner.spawn(user_id.clone(), city_ids).await {
                tracing::error!(user_id = %user_id, error = %e, "Weather collection task failed");
            }
        }
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(StartCollectionResponse {
            message: STARTED_MESSAGE.to_string(),
            user_id,
        }),
    ))
}

/// GET /weather/{user_id} — Current progress snapshot.
#[utoipa::path(
    get,
    path = "/weather/{user_id}",
    tag = "weather",
    params(("user_id" = String, Path, description = "Owner of the collection job")),
    responses(
        (status = 200, description = "Progress and results so far", body = ProgressResponse),
        (status = 404, description = "Invalid user_id", body = ErrorResponse),
    )
)]
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<ProgressResponse>> {
    let view = state.progress.get_progress(&user_id)?;
    Ok(Json(view.into()))
}

/// Build the weather router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/weather", post(start_collection))
        .route("/weather/", post(start_collection))
        .route("/weather/{user_id}", get(get_progress))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::NoPacing;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::Notify;
    use tower::ServiceExt;
    use weather_collector_core::upstream::WeatherProvider;
    use weather_collector_core::{FetchOutcome, UpstreamError};

    /// Known cities succeed; anything else is an HTTP 500 from upstream.
    struct StaticProvider(HashMap<CityId, (f64, f64)>);

    impl StaticProvider {
        fn new(cities: &[(CityId, f64, f64)]) -> Self {
            Self(cities.iter().map(|&(id, t, h)| (id, (t, h))).collect())
        }
    }

    #[async_trait]
    impl WeatherProvider for StaticProvider {
        async fn fetch(&self, city_id: CityId) -> FetchOutcome {
            self.0
                .get(&city_id)
                .map(|&(t, h)| CityWeather::new(city_id, t, h))
                .ok_or(UpstreamError::Status(500))
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    /// Never answers until the gate is opened.
    struct GatedProvider(Arc<Notify>);

    #[async_trait]
    impl WeatherProvider for GatedProvider {
        async fn fetch(&self, city_id: CityId) -> FetchOutcome {
            self.0.notified().await;
            Ok(CityWeather::new(city_id, 0.0, 0.0))
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    fn app_with(provider: Arc<dyn WeatherProvider>, mode: StartMode) -> (Arc<AppState>, Router) {
        let state = AppState::new(provider, Arc::new(NoPacing), mode);
        let app = router().with_state(Arc::clone(&state));
        (state, app)
    }

    fn default_app() -> (Arc<AppState>, Router) {
        app_with(
            Arc::new(StaticProvider::new(&[
                (100, 20.0, 60.0),
                (12345, 20.0, 60.0),
                (67890, 21.5, 55.0),
            ])),
            StartMode::Blocking,
        )
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    async fn start(app: &Router, body: &str) -> (StatusCode, Vec<u8>) {
        send(app, "POST", "/weather/", Some(body)).await
    }

    async fn poll(app: &Router, user_id: &str) -> (StatusCode, Vec<u8>) {
        send(app, "GET", &format!("/weather/{user_id}"), None).await
    }

    fn error_of(bytes: &[u8]) -> String {
        serde_json::from_slice::<ErrorResponse>(bytes).unwrap().error
    }

    #[tokio::test]
    async fn test_start_returns_202_and_collects_everything() {
        let (state, app) = default_app();

        let (status, body) = start(&app, r#"{"user_id":"test_user","city_ids":[12345,67890]}"#).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let resp: StartCollectionResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(resp.message, "Weather data collection started");
        assert_eq!(resp.user_id, "test_user");

        let view = state.store.snapshot("test_user").unwrap();
        assert_eq!(view.total_cities, 2);
        assert_eq!(view.progress_percent, 100.0);
    }

    #[tokio::test]
    async fn test_partial_failure_scenario() {
        let (_state, app) = default_app();

        let (status, _) = start(&app, r#"{"user_id":"u1","city_ids":[100,200]}"#).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, body) = poll(&app, "u1").await;
        assert_eq!(status, StatusCode::OK);
        let progress: ProgressResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(progress.progress, 50.0);
        assert_eq!(progress.completed_cities, 1);
        assert_eq!(progress.weather_data, vec![CityWeather::new(100, 20.0, 60.0)]);
    }

    #[tokio::test]
    async fn test_progress_wire_format() {
        let (_state, app) = default_app();
        start(&app, r#"{"user_id":"u1","city_ids":[100]}"#).await;

        let (_, body) = poll(&app, "u1").await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["user_id"], "u1");
        assert!(json["datetime"].is_string());
        assert_eq!(json["progress"].as_f64(), Some(100.0));
        assert_eq!(json["weather_data"][0]["city_id"], 100);
        assert_eq!(json["weather_data"][0]["temperature"].as_f64(), Some(20.0));
        assert_eq!(json["weather_data"][0]["humidity"].as_f64(), Some(60.0));
    }

    #[tokio::test]
    async fn test_missing_user_id_returns_400() {
        let (state, app) = default_app();
        let (status, body) = start(&app, r#"{"city_ids":[12345,67890]}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "user_id and city_ids are required");
        assert!(state.store.is_empty());
    }

    #[tokio::test]
    async fn test_empty_fields_return_400() {
        let (_state, app) = default_app();
        for body in [
            r#"{"user_id":"u1","city_ids":[]}"#,
            r#"{"user_id":"","city_ids":[1]}"#,
            r#"{"user_id":"u1"}"#,
            r#"{"user_id":null,"city_ids":[1]}"#,
            r#"{}"#,
        ] {
            let (status, _) = start(&app, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        }
    }

    #[tokio::test]
    async fn test_malformed_body_returns_400() {
        let (_state, app) = default_app();
        for body in [r#"{"user_id":"u1","city_ids":["abc"]}"#, "not json"] {
            let (status, bytes) = start(&app, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(error_of(&bytes), "Invalid request body");
        }
    }

    #[tokio::test]
    async fn test_duplicate_user_returns_400_and_keeps_first_job() {
        let (state, app) = default_app();
        let (status, _) = start(&app, r#"{"user_id":"u1","city_ids":[100,200]}"#).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let before = state.store.snapshot("u1").unwrap();

        let (status, body) = start(&app, r#"{"user_id":"u1","city_ids":[12345]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_of(&body), "user_id must be unique");
        assert_eq!(state.store.snapshot("u1").unwrap(), before);
    }

    #[tokio::test]
    async fn test_unknown_user_returns_404() {
        let (_state, app) = default_app();
        let (status, body) = poll(&app, "unknown_user").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_of(&body), "Invalid user_id");
    }

    #[tokio::test]
    async fn test_repeated_polls_are_identical() {
        let (_state, app) = default_app();
        start(&app, r#"{"user_id":"u1","city_ids":[100,200]}"#).await;

        let (_, first) = poll(&app, "u1").await;
        let (_, second) = poll(&app, "u1").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_route_without_trailing_slash() {
        let (_state, app) = default_app();
        let (status, _) = send(
            &app,
            "POST",
            "/weather",
            Some(r#"{"user_id":"u1","city_ids":[100]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_background_start_reports_zero_before_any_fetch() {
        let gate = Arc::new(Notify::new());
        let (state, app) = app_with(
            Arc::new(GatedProvider(Arc::clone(&gate))),
            StartMode::Background,
        );

        let (status, _) = start(&app, r#"{"user_id":"u1","city_ids":[1,2]}"#).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        let (status, body) = poll(&app, "u1").await;
        assert_eq!(status, StatusCode::OK);
        let progress: ProgressResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(progress.progress, 0.0);
        assert!(progress.weather_data.is_empty());
        assert_eq!(progress.total_cities, 2);

        // Release both fetches and wait for the job to finish.
        gate.notify_one();
        for _ in 0..100 {
            if state.store.is_complete("u1") == Some(true) {
                break;
            }
            gate.notify_one();
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(state.store.snapshot("u1").unwrap().progress_percent, 100.0);
    }

    /// Takes a fixed time per city.
    struct SlowProvider(Duration);

    #[async_trait]
    impl WeatherProvider for SlowProvider {
        async fn fetch(&self, city_id: CityId) -> FetchOutcome {
            tokio::time::sleep(self.0).await;
            Ok(CityWeather::new(city_id, 12.0, 40.0))
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocking_run_survives_dropped_request() {
        let (state, app) = app_with(
            Arc::new(SlowProvider(Duration::from_millis(50))),
            StartMode::Blocking,
        );
        let body = r#"{"user_id":"u1","city_ids":[1,2,3,4,5,6,7,8,9,10]}"#;

        // Client gives up while the run is still going.
        let cut = tokio::time::timeout(Duration::from_millis(120), start(&app, body)).await;
        assert!(cut.is_err());

        tokio::time::sleep(Duration::from_secs(1)).await;
        let view = state.store.snapshot("u1").unwrap();
        assert_eq!(view.completed_cities, 10);
        assert_eq!(view.progress_percent, 100.0);
    }

    #[tokio::test]
    async fn test_whitespace_user_id_is_accepted() {
        let (state, app) = default_app();
        let (status, _) = start(&app, r#"{"user_id":"   ","city_ids":[100]}"#).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(state.store.snapshot("   ").unwrap().completed_cities, 1);
    }

    #[test]
    fn test_progress_response_from_empty_view() {
        let view = JobRecordView {
            user_id: "u0".to_string(),
            created_at: chrono::Utc::now(),
            total_cities: 0,
            completed_cities: 0,
            progress_percent: 0.0,
            results: vec![],
        };
        let resp = ProgressResponse::from(view);
        assert_eq!(resp.progress, 0.0);
        assert!(resp.weather_data.is_empty());
    }
}
