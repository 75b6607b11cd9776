use crate::SyncError;
use crate::metrics_defs::BATCH_FALLBACKS;
use gateway::RemoteGateway;
use shared::Airport;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

/// Batch directory attempts before degrading to per-airport lookups.
pub const BATCH_ATTEMPTS: u32 = 2;

/// What a batch fetch recovered.
#[derive(Debug, Default)]
pub struct BatchFetch {
    /// Fetched records, in request order. May cover only a subset of the
    /// requested codes: the directory omits codes it does not recognize, and
    /// the fallback path omits codes it could not recover.
    pub airports: Vec<Airport>,
    /// Per-airport lookups the fallback path gave up on.
    pub failed: usize,
}

/// Wraps the gateway's batch lookup with a bounded retry and a sequential
/// per-airport fallback.
pub struct RetryingBatchFetcher<G> {
    gateway: Arc<G>,
    retry_delay: Duration,
    request_gap: Duration,
}

impl<G: RemoteGateway> RetryingBatchFetcher<G> {
    pub fn new(gateway: Arc<G>, retry_delay: Duration, request_gap: Duration) -> Self {
        Self {
            gateway,
            retry_delay,
            request_gap,
        }
    }

    /// Fetch `faas` from the directory.
    ///
    /// Tries the batch endpoint [`BATCH_ATTEMPTS`] times with a fixed backoff
    /// in between. If every attempt fails, falls back to one lookup per code;
    /// individual fallback failures are counted, never aborting the rest.
    pub async fn fetch(&self, faas: &[String]) -> Result<BatchFetch, SyncError> {
        if faas.is_empty() {
            return Err(SyncError::EmptyBatch);
        }

        for attempt in 1..=BATCH_ATTEMPTS {
            match self.gateway.fetch_airports(faas).await {
                Ok(airports) => {
                    return Ok(BatchFetch {
                        airports,
                        failed: 0,
                    });
                }
                Err(e) => {
                    tracing::warn!(attempt, error = %e, "batch directory lookup failed");
                    if attempt < BATCH_ATTEMPTS {
                        sleep(self.retry_delay).await;
                    }
                }
            }
        }

        shared::counter!(BATCH_FALLBACKS).increment(1);
        self.fetch_sequentially(faas).await
    }

    /// One directory call per code, spaced by `request_gap` as rate-limit
    /// courtesy to the provider.
    async fn fetch_sequentially(&self, faas: &[String]) -> Result<BatchFetch, SyncError> {
        tracing::warn!(
            airports = faas.len(),
            "batch endpoint unavailable, falling back to per-airport lookups"
        );

        let mut fetch = BatchFetch::default();
        for (i, faa) in faas.iter().enumerate() {
            if i > 0 {
                sleep(self.request_gap).await;
            }
            match self.gateway.fetch_airport(faa).await {
                Ok(airport) => fetch.airports.push(airport),
                Err(e) => {
                    tracing::warn!(faa, error = %e, "per-airport directory lookup failed");
                    fetch.failed += 1;
                }
            }
        }

        Ok(fetch)
    }
}
