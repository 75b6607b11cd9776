//! Persistent airport record store.
//!
//! [`RecordStore`] is the capability interface the rest of the service
//! programs against; [`PgRecordStore`] is the Postgres implementation and
//! [`MemoryRecordStore`] a drop-in used by tests.

mod memory;
mod postgres;

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

use async_trait::async_trait;
use shared::Airport;
use thiserror::Error;

/// Errors from record store operations.
///
/// `NotFound` and `AlreadyExists` report "zero rows affected" outcomes,
/// distinct from transport/database failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no airport found for {0}")]
    NotFound(String),

    #[error("airport {0} already exists")]
    AlreadyExists(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// CRUD access to stored airport records, keyed by FAA code.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Fetch one record. `NotFound` if the code is absent.
    async fn get(&self, faa: &str) -> Result<Airport, StoreError>;

    /// Fetch every record, ordered by FAA code.
    async fn get_all(&self) -> Result<Vec<Airport>, StoreError>;

    /// Insert a new record. `AlreadyExists` if the code is taken.
    async fn create(&self, airport: &Airport) -> Result<(), StoreError>;

    /// Overwrite an existing record. `NotFound` if no row was affected.
    async fn update(&self, airport: &Airport) -> Result<(), StoreError>;

    /// Remove a record. `NotFound` if no row was affected.
    async fn delete(&self, faa: &str) -> Result<(), StoreError>;
}
