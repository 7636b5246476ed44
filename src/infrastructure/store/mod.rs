//! Store traits and implementations

mod memory;
mod traits;

pub use memory::InMemoryStore;
pub use traits::Store;
