// crates/server/src/jobs/runner.rs
//! Drives one user's weather collection job.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use weather_collector_core::upstream::WeatherProvider;
use weather_collector_core::CityId;

use super::pacing::Pacer;
use super::store::JobStore;
use super::types::{RunError, RunSummary, StoreError};
use crate::metrics;

/// Sequentially fetches every requested city and folds results into the store.
///
/// One runner instance is shared by all jobs; each `run` call owns exactly one
/// job. Two runs never race on the same record because `JobStore::create_job`
/// rejects duplicate user ids.
pub struct CollectionRunner {
    store: Arc<JobStore>,
    provider: Arc<dyn WeatherProvider>,
    pacer: Arc<dyn Pacer>,
}

impl CollectionRunner {
    pub fn new(
        store: Arc<JobStore>,
        provider: Arc<dyn WeatherProvider>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        Self {
            store,
            provider,
            pacer,
        }
    }

    /// Attempt each city once, in the order given.
    ///
    /// Upstream failures skip the city; the job is left under-counted for it.
    /// Only a missing job record aborts the run.
    pub async fn run(&self, user_id: &str, city_ids: &[CityId]) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::default();

        for &city_id in city_ids {
            match self.store.is_complete(user_id) {
                None => return Err(RunError::JobNotFound(user_id.to_string())),
                Some(true) => {
                    tracing::debug!(user_id, city_id, "Job already complete, stopping early");
                    break;
                }
                Some(false) => {}
            }

            summary.attempted += 1;
            match self.provider.fetch(city_id).await {
                Ok(weather) => match self.store.append_result(user_id, weather) {
                    Ok(progress) => {
                        summary.succeeded += 1;
                        metrics::record_upstream("success");
                        tracing::debug!(user_id, city_id, progress, "City collected");
                    }
                    Err(StoreError::NotFound(_)) => {
                        return Err(RunError::JobNotFound(user_id.to_string()));
                    }
                    Err(e) => {
                        tracing::warn!(user_id, city_id, error = %e, "Result not stored, stopping");
                        break;
                    }
                },
                Err(e) => {
                    metrics::record_upstream(e.kind());
                    tracing::warn!(
                        user_id,
                        city_id,
                        provider = self.provider.name(),
                        error = %e,
                        "Upstream fetch failed, skipping city"
                    );
                    summary.failed.push(city_id);
                }
            }

            self.pacer.pause().await;
        }

        Ok(summary)
    }

    /// `run` plus completion logging and job metrics.
    pub async fn run_and_record(
        &self,
        user_id: &str,
        city_ids: &[CityId],
    ) -> Result<RunSummary, RunError> {
        let start = Instant::now();
        let result = self.run(user_id, city_ids).await;
        let duration = start.elapsed();

        match &result {
            Ok(summary) => {
                metrics::record_job_completed(duration);
                tracing::info!(
                    user_id,
                    attempted = summary.attempted,
                    succeeded = summary.succeeded,
                    failed = summary.failed.len(),
                    failed_cities = ?summary.failed,
                    duration_secs = duration.as_secs_f64(),
                    "Weather collection finished"
                );
            }
            Err(e) => {
                metrics::record_job_aborted();
                tracing::error!(
                    user_id,
                    error = %e,
                    duration_secs = duration.as_secs_f64(),
                    "Weather collection aborted"
                );
            }
        }

        result
    }

    /// Run the job on a background task.
    pub fn spawn(self: &Arc<Self>, user_id: String, city_ids: Vec<CityId>) -> JoinHandle<()> {
        let runner = Arc::clone(self);
        tokio::spawn(async move {
            // Outcome is already logged and counted.
            let _ = runner.run_and_record(&user_id, &city_ids).await;
        })
    }

    pub fn pacer_name(&self) -> &'static str {
        self.pacer.name()
    }
}
