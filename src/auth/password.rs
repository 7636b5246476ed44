//! Password hashing and strength rules.

use bcrypt::DEFAULT_COST;

use crate::domain::{DomainError, DomainResult};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, DEFAULT_COST)
}

/// True when `password` matches the stored bcrypt `hash`.
///
/// A hash bcrypt cannot parse counts as a mismatch, so login paths
/// never have to branch on a second error type.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Enforce the strength rule new passwords must meet.
///
/// Whitespace-only input is rejected even when long enough.
pub fn check_password_strength(password: &str) -> DomainResult<()> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LENGTH;
    if long_enough && !password.trim().is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )))
    }
}
