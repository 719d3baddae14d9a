use thiserror::Error;

/// Errors surfaced to the caller. Per-placeholder problems never show up here
/// unless the caller asked for validation.
#[derive(Debug, Error)]
pub enum TemplateError {
    // Script name that can never be referenced from a template
    #[error("invalid script `{0}`: name must be a non-empty identifier")]
    InvalidScript(String),

    #[error("invalid alias `{0}`: name must be a non-empty identifier")]
    InvalidAlias(String),

    // Message is already formatted by `get_error_str`
    #[error("{0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),
}

/// Why a single alternative failed to produce a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("missing field `{0}`")]
    MissingField(String),

    #[error("cannot read field `{0}` of a non-object value")]
    NotAnObject(String),

    #[error("cannot index non-array value with [{0}]")]
    NotIndexable(i64),

    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("field `{field}` is not valid JSON: {message}")]
    InvalidJson { field: String, message: String },

    #[error("value is null")]
    NullValue,

    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("unknown alias `{0}`")]
    UnknownAlias(String),

    #[error("unknown script `{0}`")]
    UnknownScript(String),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
