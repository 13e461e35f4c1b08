// crates/server/src/jobs/store.rs
//! In-memory job state store keyed by user id.

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use weather_collector_core::CityWeather;

use super::types::{JobRecord, JobRecordView, StoreError};

/// Concurrent map from user id to job record.
///
/// Locking is per shard (`DashMap`), so unrelated jobs never contend on a
/// global lock. Every mutation of a record happens under that record's write
/// guard, so a reader never sees the counter and the results disagree.
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: DashMap<String, JobRecord>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new zero-progress record. Fails if `user_id` is already tracked.
    pub fn create_job(
        &self,
        user_id: &str,
        total_cities: u32,
        created_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        match self.jobs.entry(user_id.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(user_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(JobRecord::new(user_id.to_string(), total_cities, created_at));
                Ok(())
            }
        }
    }

    /// Append a fetched city and advance progress atomically.
    /// Returns the new progress percentage.
    pub fn append_result(&self, user_id: &str, weather: CityWeather) -> Result<f64, StoreError> {
        let mut record = self
            .jobs
            .get_mut(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))?;
        record.push_result(weather)
    }

    /// Immutable copy of the current record, if any.
    pub fn snapshot(&self, user_id: &str) -> Option<JobRecordView> {
        self.jobs.get(user_id).map(|record| record.view())
    }

    /// Whether every city of the job has been collected. `None` if unknown.
    pub fn is_complete(&self, user_id: &str) -> Option<bool> {
        self.jobs.get(user_id).map(|record| record.is_complete())
    }

    /// Drop a record. Retention is an external concern; nothing in the
    /// request path calls this.
    pub fn remove(&self, user_id: &str) -> Option<JobRecordView> {
        self.jobs.remove(user_id).map(|(_, record)| record.view())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
