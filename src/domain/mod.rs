pub mod error;
pub mod user;

// Re-export commonly used types
pub use error::{DomainError, DomainResult};
pub use user::{User, UserRole};
