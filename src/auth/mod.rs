//! JWT issuance/verification and password handling for the admin API.

pub mod jwt;
pub mod password;

pub use jwt::{AuthError, Claims, JwtConfig};
pub use password::{check_password_strength, hash_password, verify_password};
