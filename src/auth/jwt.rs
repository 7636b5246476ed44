//! JWT issuance and verification
//!
//! Tokens are HS256, carry the user's identity and role, and are bound
//! to this service through the issuer claim. All signing parameters live
//! in [`JwtConfig`]; handlers and middleware never touch `jsonwebtoken`
//! directly.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{User, UserRole};

const ISSUER: &str = "admin-kit";

/// Signing parameters shared by issuance and verification.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in hours.
    pub expiration_hours: i64,
    pub issuer: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
            issuer: ISSUER.to_string(),
        }
    }

    /// Sign a token carrying `user`'s identity.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            exp: (now + Duration::hours(self.expiration_hours)).timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|_| AuthError::TokenCreation)
    }

    /// Check signature, expiry and issuer, returning the claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }

    /// Lifetime in seconds, for the login response.
    pub fn expires_in_secs(&self) -> i64 {
        self.expiration_hours * 3600
    }
}

/// Claims carried in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub role: String,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    pub iss: String,
}

impl Claims {
    /// Typed view of the role claim. Unknown strings collapse to the
    /// least privileged role.
    pub fn role(&self) -> UserRole {
        self.role.parse().unwrap_or(UserRole::Viewer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Invalid authentication token")]
    InvalidToken,
    #[error("Token has expired")]
    ExpiredToken,
    #[error("Could not create token")]
    TokenCreation,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(role: UserRole) -> User {
        User::new("kunika", "kunika@example.com", "hash", role)
    }

    #[test]
    fn issued_tokens_verify_and_carry_the_identity() {
        let config = JwtConfig::new("test-secret", 2);
        let user = test_user(UserRole::Admin);
        let token = config.issue(&user).unwrap();

        let claims = config.decode(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "kunika");
        assert_eq!(claims.role(), UserRole::Admin);
        assert_eq!(claims.iss, "admin-kit");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_tokens_are_invalid() {
        let config = JwtConfig::new("test-secret", 2);
        assert_eq!(
            config.decode("not-a-token").unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let signer = JwtConfig::new("secret-a", 2);
        let verifier = JwtConfig::new("secret-b", 2);
        let token = signer.issue(&test_user(UserRole::Viewer)).unwrap();
        assert_eq!(
            verifier.decode(&token).unwrap_err(),
            AuthError::InvalidToken
        );
    }

    #[test]
    fn issuer_mismatch_is_rejected() {
        let mut signer = JwtConfig::new("test-secret", 2);
        signer.issuer = "someone-else".to_string();
        let verifier = JwtConfig::new("test-secret", 2);

        let token = signer.issue(&test_user(UserRole::Editor)).unwrap();
        assert!(verifier.decode(&token).is_err());
    }

    #[test]
    fn expired_tokens_report_expiry() {
        let config = JwtConfig::new("test-secret", -1);
        let token = config.issue(&test_user(UserRole::Viewer)).unwrap();
        assert_eq!(
            config.decode(&token).unwrap_err(),
            AuthError::ExpiredToken
        );
    }

    #[test]
    fn unknown_role_strings_fall_back_to_viewer() {
        let claims = Claims {
            sub: "u-1".into(),
            username: "x".into(),
            role: "superuser".into(),
            exp: 0,
            iat: 0,
            iss: ISSUER.into(),
        };
        assert_eq!(claims.role(), UserRole::Viewer);
    }
}
