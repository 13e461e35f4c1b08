// crates/server/src/jobs/progress.rs
//! Read-only progress queries over the job store.

use std::sync::Arc;

use super::store::JobStore;
use super::types::{JobRecordView, StoreError};

/// Translates store snapshots into the externally visible progress view.
#[derive(Debug, Clone)]
pub struct ProgressService {
    store: Arc<JobStore>,
}

impl ProgressService {
    pub fn new(store: Arc<JobStore>) -> Self {
        Self { store }
    }

    pub fn get_progress(&self, user_id: &str) -> Result<JobRecordView, StoreError> {
        self.store
            .snapshot(user_id)
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }
}
