//! Scripted gateway and store implementations for engine tests.

use async_trait::async_trait;
use gateway::{GatewayError, RemoteGateway};
use shared::Airport;
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use store::{RecordStore, StoreError};

/// A fully populated record as the directory would return it.
pub(crate) fn directory_airport(faa: &str) -> Airport {
    Airport {
        site_number: format!("{faa}-SITE"),
        facility_name: format!("{faa} International"),
        faa: faa.to_string(),
        icao: format!("K{faa}"),
        state_code: "GA".to_string(),
        state_full: "Georgia".to_string(),
        county: "Fulton".to_string(),
        city: format!("{faa} City"),
        ownership_type: "Public".to_string(),
        use_type: "Public Use".to_string(),
        manager: "Manager".to_string(),
        manager_phone: "555-0100".to_string(),
        latitude: "33.6404".to_string(),
        longitude: "-84.4267".to_string(),
        airport_status: "Operational".to_string(),
        weather: String::new(),
    }
}

fn provider_down() -> GatewayError {
    GatewayError::Status {
        provider: "aviation directory",
        status: reqwest::StatusCode::BAD_GATEWAY,
    }
}

/// Gateway double that records every call and fails on cue.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    pub batch_calls: Mutex<Vec<Vec<String>>>,
    pub single_calls: Mutex<Vec<String>>,
    pub weather_calls: Mutex<Vec<String>>,
    /// Fail this many batch calls before letting one succeed. `usize::MAX`
    /// makes the batch endpoint permanently unavailable.
    pub batch_failures: AtomicUsize,
    /// FAA codes whose single lookup fails.
    pub fail_singles: Mutex<HashSet<String>>,
    /// FAA codes the batch response silently omits.
    pub omit_from_batch: Mutex<HashSet<String>>,
    /// Cities whose weather lookup fails.
    pub fail_weather: Mutex<HashSet<String>>,
    pub fail_all_weather: AtomicBool,
}

impl ScriptedGateway {
    pub fn batch_call_count(&self) -> usize {
        self.batch_calls.lock().unwrap().len()
    }

    pub fn single_call_count(&self) -> usize {
        self.single_calls.lock().unwrap().len()
    }

    pub fn total_calls(&self) -> usize {
        self.batch_call_count()
            + self.single_call_count()
            + self.weather_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteGateway for ScriptedGateway {
    async fn fetch_airport(&self, faa: &str) -> Result<Airport, GatewayError> {
        self.single_calls.lock().unwrap().push(faa.to_string());
        if self.fail_singles.lock().unwrap().contains(faa) {
            return Err(GatewayError::AirportNotFound(faa.to_string()));
        }
        Ok(directory_airport(faa))
    }

    async fn fetch_airports(&self, faas: &[String]) -> Result<Vec<Airport>, GatewayError> {
        self.batch_calls.lock().unwrap().push(faas.to_vec());

        let remaining = self.batch_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != usize::MAX {
                self.batch_failures.store(remaining - 1, Ordering::SeqCst);
            }
            return Err(provider_down());
        }

        let omitted = self.omit_from_batch.lock().unwrap();
        Ok(faas
            .iter()
            .filter(|faa| !omitted.contains(*faa))
            .map(|faa| directory_airport(faa))
            .collect())
    }

    async fn fetch_weather(&self, city: &str) -> Result<String, GatewayError> {
        self.weather_calls.lock().unwrap().push(city.to_string());
        if self.fail_all_weather.load(Ordering::SeqCst)
            || self.fail_weather.lock().unwrap().contains(city)
        {
            return Err(GatewayError::Status {
                provider: "weather service",
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            });
        }
        Ok("Clear".to_string())
    }
}

/// Store double with failure injection and concurrency instrumentation.
///
/// Every operation bumps an in-flight counter around an optional delay, so a
/// test can widen race windows and then assert how many store calls ever
/// overlapped.
#[derive(Default)]
pub(crate) struct ScriptedStore {
    airports: Mutex<BTreeMap<String, Airport>>,
    pub updates: Mutex<Vec<String>>,
    pub get_all_calls: AtomicUsize,
    pub fail_all_updates: AtomicBool,
    /// FAA codes whose update fails.
    pub fail_updates: Mutex<HashSet<String>>,
    pub op_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedStore {
    pub fn with_airports(airports: Vec<Airport>) -> Self {
        let store = Self::default();
        {
            let mut map = store.airports.lock().unwrap();
            for airport in airports {
                map.insert(airport.faa.clone(), airport);
            }
        }
        store
    }

    pub fn stored(&self, faa: &str) -> Option<Airport> {
        self.airports.lock().unwrap().get(faa).cloned()
    }

    async fn track_call(&self) -> InFlightGuard<'_> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let delay = *self.op_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        InFlightGuard { store: self }
    }
}

pub(crate) struct InFlightGuard<'a> {
    store: &'a ScriptedStore,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.store.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for ScriptedStore {
    async fn get(&self, faa: &str) -> Result<Airport, StoreError> {
        let _guard = self.track_call().await;
        self.airports
            .lock()
            .unwrap()
            .get(faa)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(faa.to_string()))
    }

    async fn get_all(&self) -> Result<Vec<Airport>, StoreError> {
        let _guard = self.track_call().await;
        self.get_all_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.airports.lock().unwrap().values().cloned().collect())
    }

    async fn create(&self, airport: &Airport) -> Result<(), StoreError> {
        let _guard = self.track_call().await;
        let mut airports = self.airports.lock().unwrap();
        if airports.contains_key(&airport.faa) {
            return Err(StoreError::AlreadyExists(airport.faa.clone()));
        }
        airports.insert(airport.faa.clone(), airport.clone());
        Ok(())
    }

    async fn update(&self, airport: &Airport) -> Result<(), StoreError> {
        let _guard = self.track_call().await;
        self.updates.lock().unwrap().push(airport.faa.clone());

        if self.fail_all_updates.load(Ordering::SeqCst)
            || self.fail_updates.lock().unwrap().contains(&airport.faa)
        {
            return Err(StoreError::Database(sqlx::Error::PoolClosed));
        }

        let mut airports = self.airports.lock().unwrap();
        match airports.get_mut(&airport.faa) {
            Some(existing) => {
                *existing = airport.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(airport.faa.clone())),
        }
    }

    async fn delete(&self, faa: &str) -> Result<(), StoreError> {
        let _guard = self.track_call().await;
        self.airports
            .lock()
            .unwrap()
            .remove(faa)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(faa.to_string()))
    }
}
