use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::Json;
use engine::{SyncError, SyncScheduler};
use serde::Serialize;
use shared::Airport;
use std::sync::Arc;
use store::{RecordStore, StoreError};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub scheduler: SyncScheduler,
}

/// Uniform JSON envelope returned by every route.
#[derive(Serialize)]
struct Envelope<T: Serialize> {
    status: &'static str,
    message: String,
    data: Option<T>,
}

fn ok<T: Serialize>(message: impl Into<String>, data: Option<T>) -> Response {
    let body = Envelope {
        status: "OK",
        message: message.into(),
        data,
    };
    (StatusCode::OK, Json(body)).into_response()
}

fn error(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Envelope::<()> {
        status: "Error",
        message: message.into(),
        data: None,
    };
    (status, Json(body)).into_response()
}

fn store_error(e: StoreError) -> Response {
    match e {
        StoreError::NotFound(faa) => {
            error(StatusCode::NOT_FOUND, format!("Airport {faa} Not Found"))
        }
        StoreError::AlreadyExists(faa) => error(
            StatusCode::CONFLICT,
            format!("Airport {faa} Already Exists"),
        ),
        StoreError::Database(e) => {
            tracing::error!(error = %e, "database error");
            error(StatusCode::INTERNAL_SERVER_ERROR, "Database Error")
        }
    }
}

fn sync_error(e: SyncError) -> Response {
    let status = match &e {
        SyncError::NotFound(_) | SyncError::NothingToSync => StatusCode::NOT_FOUND,
        SyncError::Gateway(_) | SyncError::AllFailed => StatusCode::BAD_GATEWAY,
        SyncError::Closed => StatusCode::SERVICE_UNAVAILABLE,
        SyncError::Store(_) | SyncError::EmptyBatch => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error(status, e.to_string())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/airports", get(get_all_airports))
        .route("/airports/{faa}", delete(delete_airport))
        .route("/airport", post(create_airport).put(update_airport))
        .route("/airport/{faa}", get(get_airport))
        .route("/sync", post(sync_all_airports))
        .route("/sync/{faa}", post(sync_airport))
        .with_state(state)
}

/// Binds the listener and serves the API until the process exits.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "aviation weather API listening");
    axum::serve(listener, router(state)).await
}

async fn health() -> Response {
    ok("Aviation Weather API is Running", None::<()>)
}

async fn get_all_airports(State(state): State<AppState>) -> Response {
    match state.store.get_all().await {
        Ok(airports) => ok("Airports are Fetched", Some(airports)),
        Err(e) => store_error(e),
    }
}

async fn get_airport(State(state): State<AppState>, Path(faa): Path<String>) -> Response {
    match state.store.get(&faa).await {
        Ok(airport) => ok("Airport is Fetched", Some(airport)),
        Err(e) => store_error(e),
    }
}

async fn create_airport(State(state): State<AppState>, Json(airport): Json<Airport>) -> Response {
    if airport.faa.is_empty() {
        return error(StatusCode::BAD_REQUEST, "FAA identifier is required");
    }
    match state.store.create(&airport).await {
        Ok(()) => ok("Airport is Created", Some(airport)),
        Err(e) => store_error(e),
    }
}

async fn update_airport(State(state): State<AppState>, Json(airport): Json<Airport>) -> Response {
    if airport.faa.is_empty() {
        return error(StatusCode::BAD_REQUEST, "FAA identifier is required");
    }
    match state.store.update(&airport).await {
        Ok(()) => ok("Airport is Updated", Some(airport)),
        Err(e) => store_error(e),
    }
}

async fn delete_airport(State(state): State<AppState>, Path(faa): Path<String>) -> Response {
    match state.store.delete(&faa).await {
        Ok(()) => ok("Airport is Deleted", Some(faa)),
        Err(e) => store_error(e),
    }
}

async fn sync_airport(State(state): State<AppState>, Path(faa): Path<String>) -> Response {
    match state.scheduler.sync_one(&faa).await {
        Ok(airport) => ok("Airport is Synced", Some(airport)),
        Err(e) => sync_error(e),
    }
}

async fn sync_all_airports(State(state): State<AppState>) -> Response {
    match state.scheduler.sync_all().await {
        Ok(updated) => ok(format!("{updated} Airports are Synced"), Some(updated)),
        Err(e) => sync_error(e),
    }
}
