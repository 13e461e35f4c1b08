// crates/server/src/jobs/mod.rs
//! Weather collection job system.
//!
//! Provides:
//! - `JobStore` — concurrent per-user job records
//! - `CollectionRunner` — paced, sequential fetch loop for one job
//! - `Pacer` strategies — fixed interval, shared token bucket, none
//! - `ProgressService` — read-only progress queries

pub mod pacing;
pub mod progress;
pub mod runner;
pub mod store;
pub mod types;

pub use pacing::{FixedInterval, NoPacing, Pacer, TokenBucket};
pub use progress::ProgressService;
pub use runner::CollectionRunner;
pub use store::JobStore;
pub use types::{JobRecordView, RunError, RunSummary, StoreError};
