use gateway::GatewayError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during sync operations
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("no airport found for {0}")]
    NotFound(String),

    #[error("remote provider call failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("no airports to sync")]
    NothingToSync,

    #[error("no airports to fetch")]
    EmptyBatch,

    #[error("failed to sync all airports")]
    AllFailed,

    #[error("sync engine is shut down")]
    Closed,
}
