// crates/core/src/upstream/config.rs
//! Upstream provider configuration.

use std::fmt;
use std::time::Duration;

/// Public OpenWeatherMap API host.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Default bound on a single upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for an OpenWeatherMap client.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub api_key: String,
    /// Unit system passed to the provider; "metric" yields Celsius.
    pub units: String,
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: String::new(),
            units: "metric".into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

// The API key never reaches logs.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("units", &self.units)
            .field("timeout", &self.timeout)
            .finish()
    }
}
