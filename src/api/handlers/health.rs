//! Health check endpoint handlers.
//!
//! `/health` always answers 200 and reports `degraded` when the storage
//! probe fails; `/health/ready` turns the same probe into a status code and
//! returns the probe result as its body.

use std::collections::HashMap;
use std::time::Instant;

use axum::{Router, extract::State, http::StatusCode, response::Json, routing::get};
use jiff::Timestamp;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{ComponentHealth, HealthResponse, HealthStatus};
use crate::repositories::StorageBackend;
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Status summary
/// - `GET /health/ready` - Readiness probe
/// - `GET /health/live` - Liveness probe
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
}

/// Status summary including the active storage backend.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status summary", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage = check_storage(&state).await;

    let mut checks = HashMap::new();
    let status = storage.status;
    checks.insert("storage".to_string(), storage);

    Json(HealthResponse {
        status,
        version: state.version.clone(),
        timestamp: Timestamp::now().to_string(),
        storage: state.services.users.backend(),
        checks,
    })
}

/// Readiness probe endpoint.
///
/// # Responses
/// - `200 OK` - Storage answered the probe
/// - `503 Service Unavailable` - Storage probe failed
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Service is ready", body = ComponentHealth),
        (status = 503, description = "Service is not ready", body = ComponentHealth)
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<ComponentHealth>) {
    let storage = check_storage(&state).await;
    let status = match storage.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(storage))
}

/// Liveness probe endpoint; never touches storage.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Service is alive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

async fn check_storage(state: &AppState) -> ComponentHealth {
    let users = &state.services.users;
    let start_time = Instant::now();
    let result = users.check_storage().await;
    let response_time_ms = Some(start_time.elapsed().as_millis() as u64);

    match result {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some(match users.backend() {
                StorageBackend::Postgres => "Connected".to_string(),
                StorageBackend::Memory => "In-memory list".to_string(),
            }),
            response_time_ms,
        },
        Err(e) => {
            tracing::warn!(error = ?e, "Storage health probe failed");
            ComponentHealth {
                status: HealthStatus::Degraded,
                message: Some("Storage unavailable".to_string()),
                response_time_ms,
            }
        }
    }
}
