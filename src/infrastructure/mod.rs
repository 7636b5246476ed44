//! Infrastructure layer - external concerns

pub mod store;

pub use store::{InMemoryStore, Store};
