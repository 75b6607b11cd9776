use crate::batch::RetryingBatchFetcher;
use crate::metrics_defs::{AIRPORTS_FAILED, AIRPORTS_UPDATED};
use crate::{SyncError, SyncTuning};
use gateway::RemoteGateway;
use shared::Airport;
use std::collections::HashMap;
use std::sync::Arc;
use store::RecordStore;
use tokio::sync::mpsc;
use tokio::time::sleep;

/// Per-chunk tally. Outcomes are combined by addition, so the order in which
/// chunks finish does not matter.
#[derive(Debug, Default, Clone, Copy)]
struct ChunkOutcome {
    updated: usize,
    failed: usize,
}

/// Refreshes the full record set in fixed-size chunks, one concurrent task
/// per chunk, and reduces the per-chunk tallies into an overall verdict.
pub struct ChunkedSyncRunner<G, S> {
    gateway: Arc<G>,
    store: Arc<S>,
    tuning: SyncTuning,
}

impl<G: RemoteGateway, S: RecordStore> ChunkedSyncRunner<G, S> {
    pub fn new(gateway: Arc<G>, store: Arc<S>, tuning: SyncTuning) -> Self {
        Self {
            gateway,
            store,
            tuning,
        }
    }

    /// Sync every stored airport. Returns the number of records updated.
    ///
    /// Verdict policy: if anything was updated the run counts as a success
    /// even when other records failed; the caller learns about failures only
    /// by comparing the returned count against the known total. Only a run
    /// where every record failed surfaces an error.
    pub async fn sync_all(&self) -> Result<usize, SyncError> {
        let airports = self.store.get_all().await?;
        if airports.is_empty() {
            return Err(SyncError::NothingToSync);
        }

        let total = airports.len();
        let chunks: Vec<Vec<Airport>> = airports
            .chunks(self.tuning.chunk_size)
            .map(<[Airport]>::to_vec)
            .collect();

        // Sized to the chunk count: once every sender is dropped the reducer
        // knows it has seen all chunks, regardless of completion order.
        let (outcome_tx, mut outcome_rx) = mpsc::channel(chunks.len());

        for chunk in chunks {
            let gateway = self.gateway.clone();
            let store = self.store.clone();
            let tuning = self.tuning;
            let outcome_tx = outcome_tx.clone();

            tokio::spawn(async move {
                let outcome = process_chunk(gateway, store, tuning, chunk).await;
                let _ = outcome_tx.send(outcome).await;
            });
        }
        drop(outcome_tx);

        let mut updated = 0;
        let mut failed = 0;
        while let Some(outcome) = outcome_rx.recv().await {
            updated += outcome.updated;
            failed += outcome.failed;
        }

        shared::counter!(AIRPORTS_UPDATED).increment(updated as u64);
        shared::counter!(AIRPORTS_FAILED).increment(failed as u64);

        if failed > 0 {
            tracing::warn!(updated, failed, total, "bulk sync finished with failures");
            if updated == 0 {
                return Err(SyncError::AllFailed);
            }
        } else {
            tracing::info!(updated, total, "bulk sync finished");
        }

        Ok(updated)
    }
}

/// Process one chunk to completion. Never aborts on a per-record failure;
/// records are handled in chunk input order.
async fn process_chunk<G: RemoteGateway, S: RecordStore>(
    gateway: Arc<G>,
    store: Arc<S>,
    tuning: SyncTuning,
    chunk: Vec<Airport>,
) -> ChunkOutcome {
    let mut outcome = ChunkOutcome::default();

    // Records with missing attributes need their directory data refetched
    // before the weather refresh; complete records are taken as stored.
    let incomplete: Vec<String> = chunk
        .iter()
        .filter(|airport| airport.is_incomplete())
        .map(|airport| airport.faa.clone())
        .collect();

    let mut refetched: HashMap<String, Airport> = HashMap::new();
    if !incomplete.is_empty() {
        let fetcher = RetryingBatchFetcher::new(
            gateway.clone(),
            tuning.batch_retry_delay,
            tuning.request_gap,
        );
        match fetcher.fetch(&incomplete).await {
            Ok(fetch) => {
                refetched = fetch
                    .airports
                    .into_iter()
                    .map(|airport| (airport.faa.clone(), airport))
                    .collect();
            }
            Err(e) => {
                tracing::warn!(error = %e, "directory refetch failed for chunk");
            }
        }
    }

    // Incomplete records the directory did not return count as failures.
    let mut merged: Vec<Airport> = Vec::with_capacity(chunk.len());
    for airport in chunk {
        if !airport.is_incomplete() {
            merged.push(airport);
        } else if let Some(fresh) = refetched.remove(&airport.faa) {
            merged.push(fresh);
        } else {
            outcome.failed += 1;
        }
    }

    for (i, mut airport) in merged.into_iter().enumerate() {
        if i > 0 {
            sleep(tuning.write_gap).await;
        }

        if airport.city.is_empty() {
            tracing::debug!(faa = %airport.faa, "skipping weather refresh, no city on record");
            outcome.failed += 1;
            continue;
        }

        match gateway.fetch_weather(&airport.city).await {
            Ok(weather) => {
                airport.weather = weather;
                match store.update(&airport).await {
                    Ok(()) => outcome.updated += 1,
                    Err(e) => {
                        tracing::warn!(faa = %airport.faa, error = %e, "failed to persist airport");
                        outcome.failed += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(faa = %airport.faa, error = %e, "weather lookup failed");
                outcome.failed += 1;
            }
        }
    }

    outcome
}
