//! The REST surface.
//!
//! - `common`: response envelopes and the validated-JSON extractor
//! - `middleware`: bearer-token guard for protected routers
//! - `modules`: one directory per API area (handlers + DTOs)
//! - `router`: wires the modules together, with Swagger docs

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::create_api_router;
