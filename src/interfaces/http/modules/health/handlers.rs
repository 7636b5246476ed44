//! Health endpoint
//!
//! Liveness plus a store probe. An in-memory store read cannot
//! realistically fail, but the probe keeps the contract honest for
//! store backends that can.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::infrastructure::Store;

/// State the health route needs.
#[derive(Clone)]
pub struct HealthState {
    pub store: Arc<dyn Store>,
    pub started_at: Arc<Instant>,
}

/// Body of the health report.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub store: ComponentHealth,
    /// Collections currently served.
    pub collections: u32,
}

/// Probe result for one dependency.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store probe failed", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<HealthState>,
) -> (StatusCode, Json<HealthResponse>) {
    let probe = Instant::now();
    let collections = state.store.collection_names().await.ok();
    let healthy = collections.is_some();

    let response = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store: ComponentHealth {
            status: if healthy { "ok" } else { "error" }.to_string(),
            latency_ms: healthy.then(|| probe.elapsed().as_millis() as u64),
        },
        collections: collections.map_or(0, |names| names.len() as u32),
    };

    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}
