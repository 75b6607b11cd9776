use crate::{SyncError, SyncService};
use gateway::RemoteGateway;
use shared::Airport;
use std::sync::Arc;
use store::RecordStore;
use tokio::sync::{mpsc, oneshot};

/// Pending jobs admitted per queue before producers start waiting.
pub const QUEUE_CAPACITY: usize = 100;

struct SingleSyncJob {
    faa: String,
    reply: oneshot::Sender<Result<Airport, SyncError>>,
}

struct BulkSyncJob {
    reply: oneshot::Sender<Result<usize, SyncError>>,
}

/// Serializes sync requests onto one in-flight operation per kind.
///
/// Two bounded queues, each drained by a dedicated consumer task that runs
/// one job to completion before pulling the next. That keeps bulk syncs
/// strictly one-at-a-time and single-record syncs strictly one-at-a-time,
/// while the two kinds still overlap with each other. Every job carries a
/// oneshot reply, so each caller gets exactly one result.
///
/// Cloning the handle is cheap; dropping the last clone closes both queues,
/// letting in-flight jobs finish and the consumer tasks exit.
#[derive(Clone)]
pub struct SyncScheduler {
    single_tx: mpsc::Sender<SingleSyncJob>,
    bulk_tx: mpsc::Sender<BulkSyncJob>,
}

impl SyncScheduler {
    /// Spawns the two consumer tasks and returns the submission handle.
    pub fn start<G, S>(service: SyncService<G, S>) -> Self
    where
        G: RemoteGateway,
        S: RecordStore,
    {
        let service = Arc::new(service);

        let (single_tx, mut single_rx) = mpsc::channel::<SingleSyncJob>(QUEUE_CAPACITY);
        let (bulk_tx, mut bulk_rx) = mpsc::channel::<BulkSyncJob>(QUEUE_CAPACITY);

        let single_service = service.clone();
        tokio::spawn(async move {
            while let Some(job) = single_rx.recv().await {
                let result = single_service.sync_one(&job.faa).await;
                // The caller may have given up waiting; the result dies with it.
                let _ = job.reply.send(result);
            }
            tracing::debug!("single-sync queue closed");
        });

        tokio::spawn(async move {
            while let Some(job) = bulk_rx.recv().await {
                let result = service.sync_all().await;
                let _ = job.reply.send(result);
            }
            tracing::debug!("bulk-sync queue closed");
        });

        Self { single_tx, bulk_tx }
    }

    /// Queue a single-record sync and wait for its result. Blocks while the
    /// queue is full; applies no timeout of its own.
    pub async fn sync_one(&self, faa: &str) -> Result<Airport, SyncError> {
        let (reply, result) = oneshot::channel();
        self.single_tx
            .send(SingleSyncJob {
                faa: faa.to_string(),
                reply,
            })
            .await
            .map_err(|_| SyncError::Closed)?;
        result.await.map_err(|_| SyncError::Closed)?
    }

    /// Queue a bulk sync and wait for the updated-record count.
    pub async fn sync_all(&self) -> Result<usize, SyncError> {
        let (reply, result) = oneshot::channel();
        self.bulk_tx
            .send(BulkSyncJob { reply })
            .await
            .map_err(|_| SyncError::Closed)?;
        result.await.map_err(|_| SyncError::Closed)?
    }
}
