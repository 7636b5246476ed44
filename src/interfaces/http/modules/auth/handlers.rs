//! Authentication API handlers
//!
//! Login deliberately answers unknown usernames and wrong passwords with
//! the same message, so the endpoint cannot be used to probe for accounts.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use tracing::{info, warn};

use super::dto::{ChangePasswordRequest, LoginRequest, LoginResponse, UserInfo};
use crate::auth::{check_password_strength, hash_password, verify_password, JwtConfig};
use crate::domain::{DomainResult, User};
use crate::infrastructure::Store;
use crate::interfaces::http::common::{domain_error_response, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub store: Arc<dyn Store>,
    pub jwt_config: JwtConfig,
}

type HandlerResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<T>>)>;

fn reject<T>(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ApiResponse<T>>) {
    (status, Json(ApiResponse::error(message)))
}

fn internal<T>(error: impl std::fmt::Display) -> (StatusCode, Json<ApiResponse<T>>) {
    reject(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

/// Look a user up by username first, then by email.
async fn find_by_login(store: &dyn Store, login: &str) -> DomainResult<Option<User>> {
    if let Some(user) = store.find_user_by_username(login).await? {
        return Ok(Some(user));
    }
    store.find_user_by_email(login).await
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> HandlerResult<LoginResponse> {
    let user = find_by_login(state.store.as_ref(), &request.username)
        .await
        .map_err(internal)?
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;

    if !user.is_active {
        return Err(reject(StatusCode::UNAUTHORIZED, "Account is disabled"));
    }
    if !verify_password(&request.password, &user.password_hash) {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    let mut stamped = user.clone();
    stamped.last_login_at = Some(Utc::now());
    if let Err(e) = state.store.update_user(stamped).await {
        // Best effort; the login itself still succeeds
        warn!("Could not stamp last_login_at: {e}");
    }

    let token = state.jwt_config.issue(&user).map_err(internal)?;
    info!("User {} logged in", user.username);

    Ok(Json(ApiResponse::success(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_config.expires_in_secs(),
        user: UserInfo::from(&user),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user info", body = ApiResponse<UserInfo>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_current_user(
    State(state): State<AuthHandlerState>,
    user: Option<axum::Extension<AuthenticatedUser>>,
) -> HandlerResult<UserInfo> {
    let user = user.ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

    // Read the store rather than echoing the token, so role changes made
    // after issuance show up immediately
    let stored = state
        .store
        .get_user(&user.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;

    Ok(Json(ApiResponse::success(UserInfo::from(&stored))))
}

#[utoipa::path(
    put,
    path = "/api/v1/auth/change-password",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "New password too weak"),
        (status = 401, description = "Invalid current password")
    )
)]
pub async fn change_password(
    State(state): State<AuthHandlerState>,
    user: Option<axum::Extension<AuthenticatedUser>>,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> HandlerResult<()> {
    let user = user.ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))?;

    check_password_strength(&request.new_password).map_err(domain_error_response)?;

    let mut stored = state
        .store
        .get_user(&user.user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;

    if !verify_password(&request.current_password, &stored.password_hash) {
        return Err(reject(StatusCode::UNAUTHORIZED, "Invalid current password"));
    }

    stored.password_hash = hash_password(&request.new_password).map_err(internal)?;
    stored.updated_at = Utc::now();
    state
        .store
        .update_user(stored)
        .await
        .map_err(domain_error_response)?;
    info!("User {} changed their password", user.username);

    Ok(Json(ApiResponse::success(())))
}
