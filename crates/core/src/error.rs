// crates/core/src/error.rs
use thiserror::Error;

/// Errors produced by an upstream weather provider.
///
/// Every per-city failure maps to one of these; the client never retries.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Upstream request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed upstream response: {0}")]
    Malformed(String),

    #[error("OpenWeather API token is not configured")]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl UpstreamError {
    /// Short label for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Status(_) => "status",
            UpstreamError::Timeout => "timeout",
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Malformed(_) => "malformed",
            UpstreamError::MissingApiKey => "missing_api_key",
            UpstreamError::ClientBuild(_) => "client_build",
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            UpstreamError::Status(status.as_u16())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}
