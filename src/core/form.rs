//! Form field rules
//!
//! Validation rules are data, not scattered conditionals: each [`Field`]
//! carries a list of [`Rule`]s, and a [`FormSchema`] checks a JSON payload
//! against its fields. Messages interpolate the field label, so the same
//! rule reads naturally on any field ("Name is required", "Email is
//! required").

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::row::CellValue;

/// Custom check: returns a complete message on failure.
pub type CustomRule = Arc<dyn Fn(&CellValue) -> Option<String> + Send + Sync>;

/// One validation rule.
///
/// The built-in rules treat an absent or empty value as passing;
/// presence is `Required`'s job, so optional fields stay optional.
/// `Custom` is the exception: it sees every value, absent ones
/// included, and decides for itself.
#[derive(Clone)]
pub enum Rule {
    /// Value must be present and, for text, non-empty.
    Required,
    /// Digits only / non-negative whole numbers.
    Numeric,
    /// Text must be at least this many characters.
    MinLength(usize),
    /// Text must be at most this many characters.
    MaxLength(usize),
    /// Numeric value must be at least this.
    Min(f64),
    /// Numeric value must be at most this.
    Max(f64),
    /// Text must equal one of the options.
    OneOf(Vec<String>),
    /// Text must match; `message` overrides the generic one.
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
    Custom(CustomRule),
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "Required"),
            Rule::Numeric => write!(f, "Numeric"),
            Rule::MinLength(n) => write!(f, "MinLength({n})"),
            Rule::MaxLength(n) => write!(f, "MaxLength({n})"),
            Rule::Min(n) => write!(f, "Min({n})"),
            Rule::Max(n) => write!(f, "Max({n})"),
            Rule::OneOf(options) => write!(f, "OneOf({options:?})"),
            Rule::Pattern { regex, .. } => write!(f, "Pattern({})", regex.as_str()),
            Rule::Custom(_) => write!(f, "Custom(<fn>)"),
        }
    }
}

impl Rule {
    /// Check `value`, interpolating `label` into the failure message.
    pub fn check(&self, label: &str, value: &CellValue) -> Option<String> {
        match self {
            Rule::Required => match value {
                CellValue::Null => Some(format!("{label} is required")),
                CellValue::Text(s) if s.is_empty() => Some(format!("{label} is required")),
                _ => None,
            },
            Rule::Numeric => match value {
                CellValue::Int(n) if *n < 0 => {
                    Some(format!("{label} must be a positive number"))
                }
                CellValue::Float(n) if *n < 0.0 || n.fract() != 0.0 => {
                    Some(format!("{label} must be a positive number"))
                }
                CellValue::Text(s) if !s.is_empty() && !s.bytes().all(|b| b.is_ascii_digit()) => {
                    Some(format!("{label} must be a positive number"))
                }
                _ => None,
            },
            Rule::MinLength(min) => match value {
                CellValue::Text(s) if !s.is_empty() && s.chars().count() < *min => Some(
                    format!("{label} must be at least {min} characters"),
                ),
                _ => None,
            },
            Rule::MaxLength(max) => match value {
                CellValue::Text(s) if s.chars().count() > *max => {
                    Some(format!("{label} must be at most {max} characters"))
                }
                _ => None,
            },
            Rule::Min(min) => match numeric(value) {
                Some(n) if n < *min => Some(format!("{label} must be at least {min}")),
                _ => None,
            },
            Rule::Max(max) => match numeric(value) {
                Some(n) if n > *max => Some(format!("{label} must be at most {max}")),
                _ => None,
            },
            Rule::OneOf(options) => match value {
                CellValue::Text(s) if !s.is_empty() && !options.contains(s) => Some(format!(
                    "{label} must be one of: {}",
                    options.join(", ")
                )),
                _ => None,
            },
            Rule::Pattern { regex, message } => match value {
                CellValue::Text(s) if !s.is_empty() && !regex.is_match(s) => Some(
                    message
                        .clone()
                        .unwrap_or_else(|| format!("{label} is invalid")),
                ),
                _ => None,
            },
            Rule::Custom(check) => check(value),
        }
    }
}

/// Numeric reading of a value: numbers directly, text via parse.
fn numeric(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Int(n) => Some(*n as f64),
        CellValue::Float(n) => Some(*n),
        CellValue::Text(s) if !s.is_empty() => s.parse().ok(),
        _ => None,
    }
}

/// The widget a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Select,
    Checkbox,
    Switch,
}

/// One form field: identity, label, widget and its rules.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub rules: Vec<Rule>,
    /// Options for `Select`, empty otherwise.
    pub options: Vec<String>,
}

impl Field {
    fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            rules: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    /// Number input; digits-only comes built in.
    pub fn number(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Number).rule(Rule::Numeric)
    }

    pub fn select(
        name: impl Into<String>,
        label: impl Into<String>,
        options: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let mut field = Self::new(name, label, FieldKind::Select).rule(Rule::OneOf(options.clone()));
        field.options = options;
        field
    }

    pub fn checkbox(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Checkbox)
    }

    pub fn switch(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Switch)
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self) -> Self {
        self.rule(Rule::Required)
    }

    pub fn min_length(self, min: usize) -> Self {
        self.rule(Rule::MinLength(min))
    }

    pub fn max_length(self, max: usize) -> Self {
        self.rule(Rule::MaxLength(max))
    }

    pub fn min(self, min: f64) -> Self {
        self.rule(Rule::Min(min))
    }

    pub fn max(self, max: f64) -> Self {
        self.rule(Rule::Max(max))
    }

    pub fn pattern(self, regex: Regex, message: Option<String>) -> Self {
        self.rule(Rule::Pattern { regex, message })
    }

    pub fn custom<F>(self, check: F) -> Self
    where
        F: Fn(&CellValue) -> Option<String> + Send + Sync + 'static,
    {
        self.rule(Rule::Custom(Arc::new(check)))
    }

    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|rule| matches!(rule, Rule::Required))
    }

    /// First failing rule's message, or `None` when the value passes.
    pub fn validate(&self, value: &CellValue) -> Option<String> {
        self.rules
            .iter()
            .find_map(|rule| rule.check(&self.label, value))
    }

    /// Serializable description for clients rendering the form.
    pub fn describe(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.clone(),
            label: self.label.clone(),
            kind: self.kind,
            required: self.is_required(),
            options: self.options.clone(),
        }
    }
}

/// Client-facing field description (rules stay server-side).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<String>,
}

/// A failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// A named set of fields validated together.
#[derive(Debug, Clone)]
pub struct FormSchema {
    pub name: String,
    pub fields: Vec<Field>,
}

impl FormSchema {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Check a JSON object against the schema: at most one error per field,
    /// in field order. An empty result means the payload is valid. Non-object
    /// payloads look like all-absent values.
    pub fn validate(&self, values: &serde_json::Value) -> Vec<FieldError> {
        self.fields
            .iter()
            .filter_map(|field| {
                let value = values
                    .get(&field.name)
                    .map(CellValue::from)
                    .unwrap_or(CellValue::Null);
                field.validate(&value).map(|message| FieldError {
                    field: field.name.clone(),
                    message,
                })
            })
            .collect()
    }

    pub fn is_valid(&self, values: &serde_json::Value) -> bool {
        self.validate(values).is_empty()
    }

    pub fn describe(&self) -> Vec<FieldDescriptor> {
        self.fields.iter().map(Field::describe).collect()
    }
}
