//! Errors raised outside of per-field validation.

use thiserror::Error;

use super::FieldErrors;

/// A schema that cannot be used as declared.
///
/// These are programming mistakes in the schema itself and are reported when
/// the schema is built or registered, never while validating input.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// A derived field names a source that is not declared before it.
    #[error("derived field '{derived}' depends on undeclared field '{source_field}'")]
    UnknownSource {
        derived: String,
        source_field: String,
    },

    /// A derived field reuses the name of a declared or derived field.
    #[error("derived field '{0}' collides with an existing field")]
    NameCollision(String),

    /// A record-level rule refers to a field the schema does not declare.
    #[error("rule '{rule}' refers to undeclared field '{field}'")]
    UnknownRuleField { rule: String, field: String },

    /// A declared default does not pass its own field schema.
    #[error("default value for '{field}' is invalid: {errors}")]
    InvalidDefault { field: String, errors: FieldErrors },

    /// A text pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A nested schema is broken; `field` locates it in the parent.
    #[error("in field '{field}': {source}")]
    Nested {
        field: String,
        #[source]
        source: Box<DefinitionError>,
    },
}

/// Failure to turn JSON text into a validated record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(FieldErrors),
}

impl From<FieldErrors> for RecordError {
    fn from(errors: FieldErrors) -> Self {
        RecordError::Invalid(errors)
    }
}

impl RecordError {
    /// The validation errors, if the input parsed but did not validate.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            RecordError::Invalid(errors) => Some(errors),
            RecordError::Json(_) => None,
        }
    }
}
