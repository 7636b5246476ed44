use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::core::form::{FieldDescriptor, FieldError, FieldKind};

/// What a client needs to render one field. Rules stay server-side;
/// only the `required` flag leaks through so forms can mark labels.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldDescriptorDto {
    pub name: String,
    pub label: String,
    /// Widget kind: `text`, `number`, `select`, `checkbox` or `switch`.
    pub kind: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
}

impl From<FieldDescriptor> for FieldDescriptorDto {
    fn from(descriptor: FieldDescriptor) -> Self {
        Self {
            name: descriptor.name,
            label: descriptor.label,
            kind: kind_name(descriptor.kind).to_string(),
            required: descriptor.required,
            options: descriptor.options,
        }
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Number => "number",
        FieldKind::Select => "select",
        FieldKind::Checkbox => "checkbox",
        FieldKind::Switch => "switch",
    }
}

/// A registered form with its renderable fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FormDescriptorDto {
    pub name: String,
    pub fields: Vec<FieldDescriptorDto>,
}

/// One failed field check.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorDto {
    pub field: String,
    pub message: String,
}

impl From<FieldError> for FieldErrorDto {
    fn from(error: FieldError) -> Self {
        Self {
            field: error.field,
            message: error.message,
        }
    }
}

/// Result of validating a submission against a form schema.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub errors: Vec<FieldErrorDto>,
}
