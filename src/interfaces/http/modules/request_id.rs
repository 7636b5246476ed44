//! Correlation IDs for request logging.
//!
//! Every request gets an ID, reused from an incoming `X-Request-Id`
//! header when the caller supplied one. The ID rides in the request
//! extensions, in a span wrapping the rest of the pipeline, and in the
//! response headers, so one grep ties client, logs, and reply together.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Header the correlation ID travels in, both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation ID as stored in request extensions, for handlers that
/// want to attach it to their own records.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

pub async fn propagate(mut request: Request<Body>, next: Next) -> Response {
    let id = incoming_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());
    request.extensions_mut().insert(RequestId(id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        uri = %request.uri(),
    );
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = id.parse() {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// The caller-supplied ID, when present and readable as a string.
fn incoming_id(request: &Request<Body>) -> Option<String> {
    let value = request.headers().get(REQUEST_ID_HEADER)?;
    value.to_str().ok().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    fn app() -> Router {
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn(propagate))
    }

    async fn send(req: Request<Body>) -> axum::http::Response<Body> {
        use tower::Service;
        let mut svc = app().into_service();
        svc.call(req).await.unwrap()
    }

    #[tokio::test]
    async fn generates_an_id_when_absent() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = send(req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let id = resp.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(!id.to_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn echoes_the_incoming_id() {
        let req = Request::builder()
            .uri("/")
            .header(REQUEST_ID_HEADER, "trace-me-42")
            .body(Body::empty())
            .unwrap();
        let resp = send(req).await;
        assert_eq!(
            resp.headers().get(REQUEST_ID_HEADER).unwrap(),
            "trace-me-42"
        );
    }
}
