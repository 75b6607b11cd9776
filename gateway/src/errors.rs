use thiserror::Error;

/// Errors from remote provider calls.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} returned status {status}")]
    Status {
        provider: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("failed to decode {provider} response: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("no airport found upstream for {0}")]
    AirportNotFound(String),

    #[error("weather API key is not configured")]
    MissingApiKey,
}
