use thiserror::Error;

/// Failures surfaced by the normalization core.
///
/// Malformed input lines and unmappable keys are absorbed where they occur and
/// never show up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// The top-level record was not a JSON object.
    #[error("expected a JSON object at the top level of the record, found {found}")]
    NotAnObject { found: &'static str },

    /// A mapped row did not cover the canonical schema exactly.
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    #[error("invalid mapping configuration: {0}")]
    InvalidConfig(String),
}

pub type NormalizeResult<T> = std::result::Result<T, NormalizeError>;

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
