use crate::{RecordStore, StoreError};
use async_trait::async_trait;
use shared::Airport;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// In-memory [`RecordStore`] with the same zero-rows semantics as the
/// Postgres implementation. A `BTreeMap` keeps `get_all` ordered by FAA code.
#[derive(Default)]
pub struct MemoryRecordStore {
    airports: RwLock<BTreeMap<String, Airport>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_airports(airports: Vec<Airport>) -> Self {
        let store = Self::new();
        {
            let mut map = store.airports.write().await;
            for airport in airports {
                map.insert(airport.faa.clone(), airport);
            }
        }
        store
    }

    pub async fn len(&self) -> usize {
        self.airports.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.airports.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, faa: &str) -> Result<Airport, StoreError> {
        self.airports
            .read()
            .await
            .get(faa)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(faa.to_string()))
    }

    async fn get_all(&self) -> Result<Vec<Airport>, StoreError> {
        Ok(self.airports.read().await.values().cloned().collect())
    }

    async fn create(&self, airport: &Airport) -> Result<(), StoreError> {
        let mut airports = self.airports.write().await;
        if airports.contains_key(&airport.faa) {
            return Err(StoreError::AlreadyExists(airport.faa.clone()));
        }
        airports.insert(airport.faa.clone(), airport.clone());
        Ok(())
    }

    async fn update(&self, airport: &Airport) -> Result<(), StoreError> {
        let mut airports = self.airports.write().await;
        match airports.get_mut(&airport.faa) {
            Some(existing) => {
                *existing = airport.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(airport.faa.clone())),
        }
    }

    async fn delete(&self, faa: &str) -> Result<(), StoreError> {
        self.airports
            .write()
            .await
            .remove(faa)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(faa.to_string()))
    }
}
