//! Traits shared by all field schemas.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{DefinitionError, FieldErrors};
use crate::path::FieldPath;
use crate::record::FieldValue;
use crate::validation::ValidationContext;

/// A schema that validates one raw value.
///
/// Every schema type implements this, which is what lets a
/// [`RecordSchema`](crate::RecordSchema) hold fields of mixed types and nest
/// records inside records. The `Send + Sync` bounds allow a finished schema to
/// be shared between threads.
pub trait SchemaLike: Send + Sync {
    /// The typed value produced on success.
    type Output;

    /// Coerces and checks `value`, reporting errors under `path`.
    fn validate_with(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Self::Output, FieldErrors>;

    /// Like [`validate_with`](Self::validate_with), converting the output back to JSON.
    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors>;

    /// Produces the value stored in a parent record's field.
    fn validate_field(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<FieldValue, FieldErrors> {
        self.validate_to_value(value, path, ctx).map(FieldValue::Plain)
    }

    /// Checks the schema's own declaration. Only container schemas have
    /// anything to check.
    fn verify(&self) -> Result<(), DefinitionError> {
        Ok(())
    }
}

/// Object-safe view of a [`SchemaLike`], used to store heterogeneous field
/// schemas side by side.
pub trait FieldValidator: Send + Sync {
    fn validate_field(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<FieldValue, FieldErrors>;

    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors>;

    fn verify(&self) -> Result<(), DefinitionError>;
}

impl<S: SchemaLike> FieldValidator for S {
    fn validate_field(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<FieldValue, FieldErrors> {
        SchemaLike::validate_field(self, value, path, ctx)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors> {
        SchemaLike::validate_to_value(self, value, path, ctx)
    }

    fn verify(&self) -> Result<(), DefinitionError> {
        SchemaLike::verify(self)
    }
}

/// Turns a list of errors into a validation outcome.
pub(crate) fn finish<T>(value: T, errors: Vec<crate::error::FieldError>) -> Validation<T, FieldErrors> {
    match FieldErrors::from_vec(errors) {
        None => Validation::Success(value),
        Some(errors) => Validation::Failure(errors),
    }
}
