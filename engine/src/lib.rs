//! The airport synchronization engine.
//!
//! Refreshes stored airport records against the two remote providers while
//! keeping bulk and single-record syncs serialized, surviving partial
//! failures across a batch, and degrading from batch directory lookups to
//! per-airport lookups when the provider misbehaves.
//!
//! Entry point is [`SyncScheduler`]: callers submit jobs through it and
//! await their reply; one consumer task per job kind executes the
//! underlying [`SyncService`] operation at a time.

mod batch;
mod errors;
pub mod metrics_defs;
mod queue;
mod runner;
mod service;

#[cfg(test)]
pub(crate) mod testutils;

pub use batch::{BATCH_ATTEMPTS, BatchFetch, RetryingBatchFetcher};
pub use errors::SyncError;
pub use queue::{QUEUE_CAPACITY, SyncScheduler};
pub use runner::ChunkedSyncRunner;
pub use service::SyncService;

use std::time::Duration;

/// Tuning knobs for the sync engine. None of these affect correctness, only
/// how hard the engine leans on the remote providers.
#[derive(Debug, Clone, Copy)]
pub struct SyncTuning {
    /// Maximum records per concurrently processed chunk.
    pub chunk_size: usize,
    /// Backoff between the two batch directory attempts.
    pub batch_retry_delay: Duration,
    /// Gap between sequential per-airport directory lookups in the fallback
    /// path (rate-limit courtesy).
    pub request_gap: Duration,
    /// Gap between consecutive weather-and-persist rounds within a chunk.
    pub write_gap: Duration,
}

impl Default for SyncTuning {
    fn default() -> Self {
        Self {
            chunk_size: 20,
            batch_retry_delay: Duration::from_secs(2),
            request_gap: Duration::from_millis(200),
            write_gap: Duration::from_millis(200),
        }
    }
}

impl SyncTuning {
    /// All delays zeroed; used by tests.
    pub fn immediate() -> Self {
        Self {
            chunk_size: 20,
            batch_retry_delay: Duration::ZERO,
            request_gap: Duration::ZERO,
            write_gap: Duration::ZERO,
        }
    }
}
