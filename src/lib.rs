//! # Admin Kit
//!
//! Backend core for an admin panel starter kit: collection browsing with
//! paging, search, sort and filters; validated file uploads; declarative
//! form schemas; JWT authentication.
//!
//! ## Layout
//!
//! - **core**: presentation-agnostic engine (tables, pagination, forms, uploads, sessions)
//! - **domain**: business entities and the error taxonomy
//! - **infrastructure**: storage backing collections, users and assets
//! - **interfaces**: REST API with Swagger documentation
//! - **auth**: JWT authentication and password hashing
//! - **shared**: cross-cutting pieces (graceful shutdown)

pub mod auth;
pub mod config;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};
pub use infrastructure::{InMemoryStore, Store};
pub use interfaces::http::create_api_router;
