//! Authentication middleware
//!
//! Guards protected routers: reads `Authorization: Bearer <jwt>`, verifies
//! the token and stores an [`AuthenticatedUser`] in the request extensions
//! for handlers to pick up. Failures answer 401 with the standard
//! `{"success": false, "error": ...}` envelope.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::auth::{AuthError, Claims, JwtConfig};
use crate::domain::UserRole;

/// State handed to the auth middleware via `from_fn_with_state`.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// The identity a verified token resolves to.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        let role = claims.role();
        Self {
            user_id: claims.sub,
            username: claims.username,
            role,
        }
    }
}

/// Pull the token out of the Authorization header. A missing header and a
/// non-Bearer one are distinct failures.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;
    header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)
}

/// Bearer-token authentication middleware.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(request.headers())?;
    let claims = auth_state.jwt_config.decode(token)?;
    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(claims));
    Ok(next.run(request).await)
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn bearer_tokens_only() {
        assert_eq!(
            bearer_token(&headers_with("Bearer abc.def.ghi")),
            Ok("abc.def.ghi")
        );
        assert_eq!(
            bearer_token(&headers_with("Basic dXNlcjpwYXNz")),
            Err(AuthError::InvalidToken)
        );
        assert_eq!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingToken)
        );
    }

    #[test]
    fn claims_become_an_authenticated_user() {
        let config = JwtConfig::new("test-secret", 1);
        let user = User::new("alice", "alice@example.com", "hash", UserRole::Editor);
        let token = config.issue(&user).unwrap();

        let identity = AuthenticatedUser::from(config.decode(&token).unwrap());
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.username, "alice");
        assert_eq!(identity.role, UserRole::Editor);
    }
}
