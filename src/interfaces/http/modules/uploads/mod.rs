//! Uploads module: multipart validation and stored-asset management

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
