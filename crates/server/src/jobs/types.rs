// crates/server/src/jobs/types.rs
//! Types for the weather collection job system.

use chrono::{DateTime, Utc};
use thiserror::Error;
use weather_collector_core::{progress_percent, CityId, CityWeather};

/// Errors raised by the job store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Job already exists for user: {0}")]
    AlreadyExists(String),

    #[error("No job for user: {0}")]
    NotFound(String),

    #[error("Job for user {0} has already collected every city")]
    JobComplete(String),
}

/// Errors that abort a collection run.
///
/// Per-city upstream failures are never surfaced here; they are absorbed by
/// the runner and reported through `RunSummary::failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("Job record for user {0} vanished mid-run")]
    JobNotFound(String),
}

/// Mutable job record owned by the store.
///
/// Invariants: `completed_cities <= total_cities` and
/// `results.len() == completed_cities`.
#[derive(Debug)]
pub(crate) struct JobRecord {
    user_id: String,
    created_at: DateTime<Utc>,
    total_cities: u32,
    completed_cities: u32,
    results: Vec<CityWeather>,
}

impl JobRecord {
    pub(crate) fn new(user_id: String, total_cities: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            created_at,
            total_cities,
            completed_cities: 0,
            results: Vec::with_capacity(total_cities as usize),
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.completed_cities >= self.total_cities
    }

    /// Append one result and advance the counter in a single step.
    /// Returns the new progress percentage.
    pub(crate) fn push_result(&mut self, weather: CityWeather) -> Result<f64, StoreError> {
        if self.is_complete() {
            return Err(StoreError::JobComplete(self.user_id.clone()));
        }
        self.results.push(weather);
        self.completed_cities += 1;
        Ok(self.progress_percent())
    }

    pub(crate) fn progress_percent(&self) -> f64 {
        progress_percent(self.completed_cities, self.total_cities)
    }

    pub(crate) fn view(&self) -> JobRecordView {
        JobRecordView {
            user_id: self.user_id.clone(),
            created_at: self.created_at,
            total_cities: self.total_cities,
            completed_cities: self.completed_cities,
            progress_percent: self.progress_percent(),
            results: self.results.clone(),
        }
    }
}

/// Read-consistent copy of a job record.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecordView {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub total_cities: u32,
    pub completed_cities: u32,
    pub progress_percent: f64,
    /// In completion order.
    pub results: Vec<CityWeather>,
}

/// Outcome of one collection run, for logs and metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: u32,
    pub succeeded: u32,
    /// City ids whose upstream fetch failed, in attempt order.
    pub failed: Vec<CityId>,
}
