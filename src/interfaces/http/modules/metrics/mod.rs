//! Prometheus scrape endpoint and per-request metric recording

pub mod handlers;
pub mod middleware;

pub use handlers::*;
pub use middleware::track_requests;
