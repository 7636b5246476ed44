//! Collections module: browse and edit named datasets of JSON rows

pub mod handlers;

pub use handlers::*;
