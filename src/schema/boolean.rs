//! Boolean field schema.

use serde_json::Value;
use stillwater::Validation;

use crate::coerce;
use crate::error::FieldErrors;
use crate::path::FieldPath;
use crate::validation::{CoercionMode, ValidationContext};

use super::traits::SchemaLike;

/// Schema for boolean fields.
///
/// In lax mode `"yes"`, `"off"`, `"1"`, `0` and friends are accepted.
#[derive(Debug, Clone, Default)]
pub struct BoolSchema {
    mode: Option<CoercionMode>,
    type_error_message: Option<String>,
}

impl BoolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict(mut self) -> Self {
        self.mode = Some(CoercionMode::Strict);
        self
    }

    pub fn mode(mut self, mode: CoercionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    pub fn validate(&self, value: &Value) -> Validation<bool, FieldErrors> {
        self.validate_with(value, &FieldPath::root(), &ValidationContext::default())
    }
}

impl SchemaLike for BoolSchema {
    type Output = bool;

    fn validate_with(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<bool, FieldErrors> {
        match coerce::to_bool(value, self.mode.unwrap_or(ctx.mode()), path) {
            Ok(b) => Validation::Success(b),
            Err(e) => {
                let e = match &self.type_error_message {
                    Some(m) => e.with_message(m.clone()),
                    None => e,
                };
                Validation::Failure(FieldErrors::single(e))
            }
        }
    }

    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors> {
        self.validate_with(value, path, ctx).map(Value::Bool)
    }
}
