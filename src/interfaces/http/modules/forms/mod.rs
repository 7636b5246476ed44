//! Form registry module: field descriptors and server-side validation

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
