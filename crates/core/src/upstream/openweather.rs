// crates/core/src/upstream/openweather.rs
//! OpenWeatherMap "current weather" client.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::config::UpstreamConfig;
use super::provider::WeatherProvider;
use crate::error::UpstreamError;
use crate::types::{CityId, CityWeather, FetchOutcome};

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

/// Subset of the provider's response body that we read.
#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
}

/// Client for `GET /data/2.5/weather?id=..&appid=..&units=..`.
///
/// Holds one `reqwest::Client` for connection reuse; the per-request timeout
/// comes from `UpstreamConfig::timeout`.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    config: UpstreamConfig,
}

impl OpenWeatherClient {
    /// Build a client with its own connection pool.
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::ClientBuild(e.to_string()))?;
        Self::with_client(client, config)
    }

    /// Build a client on top of an existing `reqwest::Client`.
    pub fn with_client(client: Client, config: UpstreamConfig) -> Result<Self, UpstreamError> {
        if config.api_key.trim().is_empty() {
            return Err(UpstreamError::MissingApiKey);
        }
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            CURRENT_WEATHER_PATH
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, city_id: CityId) -> FetchOutcome {
        let resp = self
            .client
            .get(self.endpoint())
            .query(&[
                ("id", city_id.to_string()),
                ("appid", self.config.api_key.clone()),
                ("units", self.config.units.clone()),
            ])
            .header(CONTENT_TYPE, "application/json")
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            tracing::debug!(city_id, status = status.as_u16(), "Upstream returned non-200");
            return Err(UpstreamError::Status(status.as_u16()));
        }

        let body: CurrentWeatherResponse = resp.json().await?;
        Ok(CityWeather::new(city_id, body.main.temp, body.main.humidity))
    }

    fn name(&self) -> &str {
        "openweather"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn client_for(base_url: &str) -> OpenWeatherClient {
        OpenWeatherClient::new(UpstreamConfig::new("test-key").with_base_url(base_url)).unwrap()
    }

    fn query_for(city_id: &str) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), city_id.into()),
            Matcher::UrlEncoded("appid".into(), "test-key".into()),
            Matcher::UrlEncoded("units".into(), "metric".into()),
        ])
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let err = OpenWeatherClient::new(UpstreamConfig::new("  ")).unwrap_err();
        assert!(matches!(err, UpstreamError::MissingApiKey));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = client_for("http://localhost:1234/");
        assert_eq!(client.endpoint(), "http://localhost:1234/data/2.5/weather");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(query_for("100"))
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"Somewhere","main":{"temp":20.0,"humidity":60,"pressure":1012}}"#)
            .create_async()
            .await;

        let weather = client_for(&server.url()).fetch(100).await.unwrap();

        mock.assert_async().await;
        assert_eq!(weather, CityWeather::new(100, 20.0, 60.0));
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(query_for("200"))
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let err = client_for(&server.url()).fetch(200).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status(500)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_unknown_city_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"cod":"404","message":"city not found"}"#)
            .create_async()
            .await;

        let err = client_for(&server.url()).fetch(1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status(404)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_missing_fields_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"main":{"pressure":1012}}"#)
            .create_async()
            .await;

        let err = client_for(&server.url()).fetch(7).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_non_json_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/data/2.5/weather")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>definitely not json</html>")
            .create_async()
            .await;

        let err = client_for(&server.url()).fetch(7).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Malformed(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let err = client_for(&format!("http://{addr}")).fetch(1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_stalled_upstream_times_out() {
        // Accepted by the kernel backlog but never answered.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let config = UpstreamConfig::new("test-key")
            .with_base_url(format!("http://{addr}"))
            .with_timeout(Duration::from_millis(200));
        let client = OpenWeatherClient::new(config).unwrap();

        let err = client.fetch(1).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Timeout), "got {err:?}");
        drop(listener);
    }
}
