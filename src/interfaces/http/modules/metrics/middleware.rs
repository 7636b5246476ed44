//! Per-request metric recording.

use std::time::Instant;

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, gauge, histogram};

/// Route of the scrape endpoint; not worth observing itself.
const SCRAPE_PATH: &str = "/metrics";

/// Records three series for every request that passes through the router:
///
/// - **`http_requests_total`**: counter labelled `method`, `path`, `status`
/// - **`http_request_duration_seconds`**: histogram labelled `method`, `path`
/// - **`http_requests_in_flight`**: gauge, no labels
///
/// The `path` label uses the matched route template
/// (`/api/v1/collections/{name}`) rather than the concrete URI, keeping
/// label cardinality bounded. Scrapes of `/metrics` itself are skipped.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let path = route_template(&request);
    if path == SCRAPE_PATH {
        return next.run(request).await;
    }
    let method = request.method().to_string();

    gauge!("http_requests_in_flight").increment(1.0);
    let started = Instant::now();
    let response = next.run(request).await;
    let elapsed = started.elapsed();
    gauge!("http_requests_in_flight").decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "method" => method.clone(), "path" => path.clone(), "status" => status
    )
    .increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(elapsed.as_secs_f64());

    response
}

/// The matched route template, falling back to the raw URI path for
/// requests that matched no route (404s).
fn route_template(request: &Request<Body>) -> String {
    match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => request.uri().path().to_owned(),
    }
}
