use crate::{ChunkedSyncRunner, SyncError, SyncTuning};
use gateway::RemoteGateway;
use shared::Airport;
use std::sync::Arc;
use store::{RecordStore, StoreError};

/// The two sync operations over an injected gateway and store.
///
/// `SyncService` itself performs no serialization; submit through
/// [`crate::SyncScheduler`] to get the one-at-a-time guarantee.
pub struct SyncService<G, S> {
    gateway: Arc<G>,
    store: Arc<S>,
    tuning: SyncTuning,
}

impl<G: RemoteGateway, S: RecordStore> SyncService<G, S> {
    pub fn new(gateway: Arc<G>, store: Arc<S>, tuning: SyncTuning) -> Self {
        Self {
            gateway,
            store,
            tuning,
        }
    }

    /// Refresh one airport: refetch its directory data if any attribute is
    /// missing, always refresh its weather, persist the result.
    ///
    /// Unlike the bulk path, the first error wins and nothing partial is
    /// reported back.
    pub async fn sync_one(&self, faa: &str) -> Result<Airport, SyncError> {
        let current = match self.store.get(faa).await {
            Ok(airport) => airport,
            Err(StoreError::NotFound(faa)) => return Err(SyncError::NotFound(faa)),
            Err(e) => return Err(e.into()),
        };

        let mut airport = if current.is_incomplete() {
            self.gateway.fetch_airport(faa).await?
        } else {
            current
        };

        airport.weather = self.gateway.fetch_weather(&airport.city).await?;
        self.store.update(&airport).await?;

        tracing::debug!(faa, weather = %airport.weather, "synced airport");
        Ok(airport)
    }

    /// Refresh every stored airport; see [`ChunkedSyncRunner::sync_all`] for
    /// the partial-success policy.
    pub async fn sync_all(&self) -> Result<usize, SyncError> {
        ChunkedSyncRunner::new(self.gateway.clone(), self.store.clone(), self.tuning)
            .sync_all()
            .await
    }
}
