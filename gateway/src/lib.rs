//! Clients for the two remote data providers: the aviation directory
//! (airport metadata by FAA code) and the weather service (current
//! conditions by city).
//!
//! The sync engine consumes providers through the [`RemoteGateway`] trait so
//! tests can substitute instrumented implementations; [`HttpRemoteGateway`]
//! is the production implementation.

mod errors;
mod http;

pub use errors::GatewayError;
pub use http::HttpRemoteGateway;

use async_trait::async_trait;
use shared::Airport;

/// Capability interface over the remote providers.
///
/// Every call can fail with a transport error or a non-success status from
/// the provider. The batch lookup may return a subset covering only the
/// identifiers the directory recognized.
#[async_trait]
pub trait RemoteGateway: Send + Sync + 'static {
    /// Look up a single airport in the aviation directory.
    async fn fetch_airport(&self, faa: &str) -> Result<Airport, GatewayError>;

    /// Look up several airports in one directory call.
    async fn fetch_airports(&self, faas: &[String]) -> Result<Vec<Airport>, GatewayError>;

    /// Fetch the current weather condition text for a city.
    async fn fetch_weather(&self, city: &str) -> Result<String, GatewayError>;
}
