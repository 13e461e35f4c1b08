// crates/core/src/upstream/provider.rs
//! WeatherProvider trait defining the interface for upstream weather sources.

use async_trait::async_trait;

use crate::types::{CityId, FetchOutcome};

/// A source of current weather for a single city.
///
/// Implementations perform exactly one upstream call per `fetch` and never
/// retry; retry policy (if any) belongs to the caller.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions for `city_id`.
    async fn fetch(&self, city_id: CityId) -> FetchOutcome;

    /// Provider name for logging (e.g. "openweather").
    fn name(&self) -> &str;
}
