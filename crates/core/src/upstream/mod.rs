// crates/core/src/upstream/mod.rs
//! Upstream weather provider integration.
//!
//! Provides the `WeatherProvider` trait and the OpenWeatherMap implementation
//! used to fetch current conditions for one city per call.

pub mod config;
pub mod openweather;
pub mod provider;

pub use config::UpstreamConfig;
pub use openweather::OpenWeatherClient;
pub use provider::WeatherProvider;
