use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use regex::Regex;

use crate::core::form::{Field, FormSchema};
use crate::core::row::CellValue;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::modules::forms::dto::{
    FieldErrorDto, FormDescriptorDto, ValidationOutcome,
};

/// State shared by the form endpoints.
#[derive(Clone)]
pub struct FormsHandlerState {
    pub registry: Arc<HashMap<String, FormSchema>>,
}

/// Registry shipped with the demo: one registration form exercising
/// every field kind and rule the engine supports.
pub fn example_registry() -> Result<HashMap<String, FormSchema>, regex::Error> {
    let email = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")?;
    let phone = Regex::new(r"^[0-9]{10}$")?;

    let example = FormSchema::new(
        "example",
        vec![
            Field::text("firstName", "First Name")
                .required()
                .min_length(2),
            Field::text("lastName", "Last Name").required().min_length(2),
            Field::text("email", "Email Address")
                .required()
                .pattern(email, Some("Enter a valid email address".to_string())),
            Field::number("age", "Age").required().min(18.0).max(120.0),
            Field::text("phoneNumber", "Phone Number")
                .required()
                .pattern(phone, Some("Phone number must be 10 digits".to_string())),
            Field::select("country", "Country", ["us", "ca", "uk", "au", "in"]).required(),
            Field::select(
                "department",
                "Department",
                ["engineering", "marketing", "sales", "hr", "finance"],
            )
            .required(),
            // Checkbox must be actively ticked, not merely present.
            Field::checkbox("terms", "Terms").custom(|value| match value {
                CellValue::Bool(true) => None,
                _ => Some("You must accept the terms and conditions".to_string()),
            }),
            Field::switch("newsletter", "Subscribe to newsletter"),
        ],
    );

    Ok(HashMap::from([(example.name.clone(), example)]))
}

#[utoipa::path(
    get,
    path = "/api/v1/forms",
    tag = "Forms",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Registered form names", body = ApiResponse<Vec<String>>)
    )
)]
pub async fn list_forms(State(state): State<FormsHandlerState>) -> Json<ApiResponse<Vec<String>>> {
    let mut names: Vec<String> = state.registry.keys().cloned().collect();
    names.sort();
    Json(ApiResponse::success(names))
}

#[utoipa::path(
    get,
    path = "/api/v1/forms/{form}",
    tag = "Forms",
    security(("bearer_auth" = [])),
    params(("form" = String, Path, description = "Form name")),
    responses(
        (status = 200, description = "Field descriptors for rendering", body = ApiResponse<FormDescriptorDto>),
        (status = 404, description = "Unknown form")
    )
)]
pub async fn get_form(
    State(state): State<FormsHandlerState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<FormDescriptorDto>>, (StatusCode, Json<ApiResponse<FormDescriptorDto>>)>
{
    let schema = state.registry.get(&name).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Form not found".to_string())),
        )
    })?;

    let fields = schema.describe().into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(FormDescriptorDto {
        name: schema.name.clone(),
        fields,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/forms/{form}/validate",
    tag = "Forms",
    security(("bearer_auth" = [])),
    params(("form" = String, Path, description = "Form name")),
    request_body = serde_json::Value,
    responses(
        (status = 200, description = "Submission passed every rule", body = ApiResponse<ValidationOutcome>),
        (status = 422, description = "Submission failed, one error per bad field", body = ApiResponse<ValidationOutcome>),
        (status = 404, description = "Unknown form")
    )
)]
pub async fn validate_form(
    State(state): State<FormsHandlerState>,
    Path(name): Path<String>,
    Json(values): Json<serde_json::Value>,
) -> Result<
    (StatusCode, Json<ApiResponse<ValidationOutcome>>),
    (StatusCode, Json<ApiResponse<ValidationOutcome>>),
> {
    let schema = state.registry.get(&name).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Form not found".to_string())),
        )
    })?;

    let errors: Vec<FieldErrorDto> = schema
        .validate(&values)
        .into_iter()
        .map(Into::into)
        .collect();
    let outcome = ValidationOutcome {
        valid: errors.is_empty(),
        errors,
    };
    let status = if outcome.valid {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    };

    Ok((
        status,
        Json(ApiResponse {
            success: outcome.valid,
            data: Some(outcome),
            error: None,
        }),
    ))
}
