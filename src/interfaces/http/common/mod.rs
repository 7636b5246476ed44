//! Shared response envelopes and extractors for the REST API

pub mod validated_json;

pub use validated_json::{InputError, InvalidBody, ValidatedJson};

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard API response wrapper.
///
/// Every single-item endpoint returns this envelope.
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "error": "description"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// `true` when the request succeeded
    pub success: bool,
    /// Payload, `null` on error
    pub data: Option<T>,
    /// Error description, absent on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// List endpoint body: the slice requested plus the pre-slice total.
///
/// `total` counts every row that matched the filters, not the page length,
/// so clients can derive page counts themselves.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Map a domain error onto the HTTP status it corresponds to.
pub fn domain_error_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
    }
}

/// Turn a domain error into the `(status, envelope)` pair handlers return.
pub fn domain_error_response<T>(error: DomainError) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        domain_error_status(&error),
        Json(ApiResponse::error(error.to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"], 42);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn error_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::<()>::error("boom")).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["data"], serde_json::Value::Null);
        assert_eq!(body["error"], "boom");
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            domain_error_status(&DomainError::not_found("row", "id", "7")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            domain_error_status(&DomainError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            domain_error_status(&DomainError::Conflict("dup".into())),
            StatusCode::CONFLICT
        );
    }
}
