//! JSON extractor with declarative validation
//!
//! Request DTOs carry `validator` rules. `ValidatedJson<T>` parses like
//! `axum::Json<T>` and then enforces those rules, so a handler only runs
//! for well-formed input. A body that does not parse answers 400; one
//! that parses but breaks a rule answers 422 listing one entry per
//! offending field, the same shape the form endpoints emit.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use super::ApiResponse;

pub struct ValidatedJson<T>(pub T);

/// One broken rule, keyed by the offending field.
#[derive(Debug, Serialize)]
pub struct InputError {
    pub field: String,
    pub message: String,
}

/// Why extraction stopped before the handler ran.
pub enum InvalidBody {
    /// The payload was not JSON, or not JSON of the expected shape.
    Malformed(JsonRejection),
    /// The payload parsed but at least one field broke its rules.
    Rejected(Vec<InputError>),
}

impl InvalidBody {
    fn collect(errors: ValidationErrors) -> Self {
        let mut fields = Vec::new();
        for (field, entries) in errors.field_errors() {
            for entry in entries {
                let message = match &entry.message {
                    Some(text) => text.to_string(),
                    None => entry.code.to_string(),
                };
                fields.push(InputError {
                    field: field.to_string(),
                    message,
                });
            }
        }
        // field_errors() hands back a map; sort for a stable wire order
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        InvalidBody::Rejected(fields)
    }
}

impl IntoResponse for InvalidBody {
    fn into_response(self) -> Response {
        match self {
            InvalidBody::Malformed(rejection) => {
                let body = ApiResponse::<()>::error(format!("Invalid JSON: {rejection}"));
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            InvalidBody::Rejected(fields) => {
                let body = ApiResponse {
                    success: false,
                    data: Some(fields),
                    error: Some("Validation failed".to_string()),
                };
                (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
            }
        }
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = InvalidBody;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(InvalidBody::Malformed)?;
        value.validate().map_err(InvalidBody::collect)?;
        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use serde_json::Value;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct Credentials {
        #[validate(length(min = 1, message = "Username is required"))]
        username: String,
        #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
        password: String,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<Credentials>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new().route("/login", post(handler))
    }

    async fn send(json: &str) -> (StatusCode, Value) {
        use tower::Service;
        let req = Request::builder()
            .method("POST")
            .uri("/login")
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap();
        let mut svc = app().into_service();
        let resp = svc.call(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn well_formed_body_reaches_the_handler() {
        let (status, _) =
            send(r#"{"username": "admin", "password": "longenough"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_a_400() {
        let (status, body) = send("not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn rule_breaks_are_listed_per_field() {
        let (status, body) = send(r#"{"username": "", "password": "short"}"#).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Validation failed");

        let fields = body["data"].as_array().unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["field"], "password");
        assert_eq!(
            fields[0]["message"],
            "Password must be at least 8 characters"
        );
        assert_eq!(fields[1]["field"], "username");
        assert_eq!(fields[1]["message"], "Username is required");
    }
}
