// crates/server/src/config.rs
//! Server configuration from command-line flags and environment variables.
//!
//! Every flag falls back to an environment variable; `main` loads a `.env`
//! file (if present) before parsing.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use weather_collector_core::upstream::config::DEFAULT_BASE_URL;
use weather_collector_core::upstream::UpstreamConfig;

use crate::jobs::{FixedInterval, NoPacing, Pacer, TokenBucket};

/// Provider-documented ceiling for the free OpenWeatherMap tier.
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 60;

/// How `POST /weather/` relates to the collection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StartMode {
    /// Acknowledge with 202 once the job is created; collect on a background task.
    Background,
    /// Collect every city before acknowledging.
    Blocking,
}

/// Pacing strategy between upstream calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PacingKind {
    /// Sleep a fixed interval after each call, per job.
    Fixed,
    /// One schedule shared by all jobs in the process.
    TokenBucket,
    /// No delay.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Weather collection service.
#[derive(Debug, Clone, Parser)]
#[command(name = "weather-collector", version)]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// OpenWeatherMap API token.
    #[arg(long, env = "OPENWEATHER_API_TOKEN", hide_env_values = true)]
    pub openweather_api_token: String,

    /// Base URL of the OpenWeatherMap API.
    #[arg(long, env = "OPENWEATHER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub upstream_url: String,

    /// Per-request upstream timeout in seconds.
    #[arg(long, env = "OPENWEATHER_TIMEOUT_SECS", default_value_t = 10)]
    pub upstream_timeout_secs: u64,

    /// Upstream request ceiling.
    #[arg(
        long,
        env = "OPENWEATHER_RATE_LIMIT_PER_MINUTE",
        default_value_t = DEFAULT_RATE_LIMIT_PER_MINUTE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub rate_limit_per_minute: u32,

    #[arg(long, env = "WEATHER_PACING", value_enum, default_value_t = PacingKind::Fixed)]
    pub pacing: PacingKind,

    #[arg(long, env = "WEATHER_START_MODE", value_enum, default_value_t = StartMode::Background)]
    pub start_mode: StartMode,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig::new(self.openweather_api_token.clone())
            .with_base_url(self.upstream_url.clone())
            .with_timeout(Duration::from_secs(self.upstream_timeout_secs))
    }

    pub fn build_pacer(&self) -> Arc<dyn Pacer> {
        match self.pacing {
            PacingKind::Fixed => Arc::new(FixedInterval::per_minute(self.rate_limit_per_minute)),
            PacingKind::TokenBucket => Arc::new(TokenBucket::per_minute(self.rate_limit_per_minute)),
            PacingKind::None => Arc::new(NoPacing),
        }
    }
}
