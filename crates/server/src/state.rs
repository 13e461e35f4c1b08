// crates/server/src/state.rs
//! Application state for the Axum server.

use std::sync::Arc;
use std::time::Instant;

use weather_collector_core::upstream::WeatherProvider;
use weather_collector_core::{Clock, SystemClock};

use crate::config::StartMode;
use crate::jobs::{CollectionRunner, JobStore, Pacer, ProgressService};

/// Shared application state accessible from all route handlers.
pub struct AppState {
    /// Server start time for uptime tracking.
    pub start_time: Instant,
    /// Per-user job records. Lives as long as the process.
    pub store: Arc<JobStore>,
    /// Fetch loop shared by every job.
    pub runner: Arc<CollectionRunner>,
    /// Read side of the store for the progress endpoint.
    pub progress: ProgressService,
    /// Timestamp source for new job records.
    pub clock: Arc<dyn Clock>,
    /// Whether the start endpoint waits for the run.
    pub start_mode: StartMode,
}

impl AppState {
    /// Create a new application state wrapped in an Arc for sharing.
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        pacer: Arc<dyn Pacer>,
        start_mode: StartMode,
    ) -> Arc<Self> {
        Self::new_with_clock(provider, pacer, start_mode, Arc::new(SystemClock))
    }

    /// Create with an externally-provided clock (for pinned timestamps in tests).
    pub fn new_with_clock(
        provider: Arc<dyn WeatherProvider>,
        pacer: Arc<dyn Pacer>,
        start_mode: StartMode,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let store = Arc::new(JobStore::new());
        Arc::new(Self {
            start_time: Instant::now(),
            runner: Arc::new(CollectionRunner::new(Arc::clone(&store), provider, pacer)),
            progress: ProgressService::new(Arc::clone(&store)),
            store,
            clock,
            start_mode,
        })
    }

    /// Get the server uptime in seconds.
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
