// crates/core/src/types.rs
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::UpstreamError;

/// Provider-defined city identifier (OpenWeatherMap city id).
pub type CityId = i64;

/// Current conditions for one successfully fetched city.
///
/// Serialized with the public field names of the progress endpoint
/// (`city_id`, `temperature`, `humidity`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CityWeather {
    pub city_id: CityId,
    /// Degrees Celsius.
    #[serde(rename = "temperature")]
    pub temperature_celsius: f64,
    /// Relative humidity, percent.
    #[serde(rename = "humidity")]
    pub humidity_percent: f64,
}

impl CityWeather {
    pub fn new(city_id: CityId, temperature_celsius: f64, humidity_percent: f64) -> Self {
        Self {
            city_id,
            temperature_celsius,
            humidity_percent,
        }
    }
}

/// Result of a single upstream call. Consumed immediately by the job runner.
pub type FetchOutcome = Result<CityWeather, UpstreamError>;

/// Percentage of `completed` over `total`, `0.0` for an empty job.
pub fn progress_percent(completed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(completed) / f64::from(total) * 100.0
}
