//! Errors surfaced by domain and storage operations.

use thiserror::Error;

/// Failure modes the HTTP layer maps onto status codes.
///
/// Display output is sent to API clients verbatim, so `Validation`
/// and `Conflict` carry the full sentence themselves.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A lookup by key matched nothing.
    #[error("No {entity} with {field} '{value}'")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    /// Input broke a domain rule.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field,
            value: value.into(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_missing_key() {
        let error = DomainError::not_found("row", "id", "42");
        assert_eq!(error.to_string(), "No row with id '42'");
    }

    #[test]
    fn validation_and_conflict_pass_messages_through() {
        let validation = DomainError::Validation("Row must be a JSON object".into());
        assert_eq!(validation.to_string(), "Row must be a JSON object");

        let conflict = DomainError::Conflict("User 'admin' already exists".into());
        assert_eq!(conflict.to_string(), "User 'admin' already exists");
    }
}
