//! Prometheus scrape endpoint.
//!
//! `GET /metrics` renders the global `metrics-exporter-prometheus`
//! recorder in Prometheus text format. Left unauthenticated so scrapers
//! need no credentials.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;

/// Handle onto the installed recorder, cloned into the route's state.
#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

pub async fn render_prometheus(State(state): State<MetricsState>) -> impl IntoResponse {
    let body = state.handle.render();
    (
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}
