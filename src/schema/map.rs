//! Mapping field schema (text keys to validated values).

use indexmap::IndexMap;
use serde_json::{Map, Value};
use stillwater::Validation;

use crate::coerce;
use crate::error::{DefinitionError, FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::record::FieldValue;
use crate::validation::ValidationContext;

use super::text::TextSchema;
use super::traits::{finish, SchemaLike};

/// Schema for free-form mappings such as contact details.
///
/// Keys are arbitrary text; every value is validated against the value
/// schema (text by default) and reported at `field.key`.
///
/// ```rust
/// use recordkit::Schema;
/// use serde_json::json;
///
/// let contact = Schema::map(Schema::text().min_len(3)).required_key("phone");
///
/// assert!(contact.validate(&json!({"phone": "555-0100"})).is_success());
/// assert!(contact.validate(&json!({"email": "a@b.co"})).is_failure());
/// ```
#[derive(Clone)]
pub struct MapSchema<S = TextSchema> {
    value_schema: S,
    min_len: Option<usize>,
    max_len: Option<usize>,
    required_keys: Vec<String>,
    type_error_message: Option<String>,
}

impl<S: SchemaLike> MapSchema<S> {
    pub fn new(value_schema: S) -> Self {
        Self {
            value_schema,
            min_len: None,
            max_len: None,
            required_keys: Vec::new(),
            type_error_message: None,
        }
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    pub fn required_key(mut self, key: impl Into<String>) -> Self {
        self.required_keys.push(key.into());
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    pub fn validate(&self, value: &Value) -> Validation<Map<String, Value>, FieldErrors> {
        self.validate_with(value, &FieldPath::root(), &ValidationContext::default())
    }
}

impl<S: SchemaLike> MapSchema<S> {
    fn validate_entries(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<IndexMap<String, FieldValue>, FieldErrors> {
        let obj = match coerce::to_object(value, path, "mapping") {
            Ok(o) => o,
            Err(e) => {
                let e = match &self.type_error_message {
                    Some(m) => e.with_message(m.clone()),
                    None => e,
                };
                return Validation::Failure(FieldErrors::single(e));
            }
        };

        let mut errors = Vec::new();
        let len = obj.len();
        if let Some(min) = self.min_len.filter(|min| len < *min) {
            errors.push(
                FieldError::constraint(path.clone(), "min_length", format!("mapping must have at least {} entries, got {}", min, len))
                    .with_expected(format!("at least {} entries", min))
                    .with_got(format!("{} entries", len)),
            );
        }
        if let Some(max) = self.max_len.filter(|max| len > *max) {
            errors.push(
                FieldError::constraint(path.clone(), "max_length", format!("mapping must have at most {} entries, got {}", max, len))
                    .with_expected(format!("at most {} entries", max))
                    .with_got(format!("{} entries", len)),
            );
        }
        for key in &self.required_keys {
            if !obj.contains_key(key) {
                errors.push(
                    FieldError::constraint(path.push_field(key), "required", format!("required key '{}' is missing", key))
                        .with_expected("value"),
                );
            }
        }

        let mut out = IndexMap::with_capacity(obj.len());
        for (key, raw) in obj {
            match self.value_schema.validate_field(raw, &path.push_field(key), ctx) {
                Validation::Success(v) => {
                    out.insert(key.clone(), v);
                }
                Validation::Failure(e) => errors.extend(e),
            }
        }
        finish(out, errors)
    }
}

impl<S: SchemaLike> SchemaLike for MapSchema<S> {
    type Output = Map<String, Value>;

    fn validate_with(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Map<String, Value>, FieldErrors> {
        self.validate_entries(value, path, ctx)
            .map(|entries| entries.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }

    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors> {
        self.validate_with(value, path, ctx).map(Value::Object)
    }

    fn validate_field(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<FieldValue, FieldErrors> {
        self.validate_entries(value, path, ctx).map(FieldValue::map)
    }

    fn verify(&self) -> Result<(), DefinitionError> {
        self.value_schema.verify()
    }
}
