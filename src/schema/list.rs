//! List field schema.
//!
//! [`ListSchema`] validates every item against an item schema (text by
//! default) and then applies length and uniqueness constraints. Item errors
//! are reported at `field[index]`.

use indexmap::IndexMap;
use serde_json::Value;
use stillwater::Validation;

use crate::coerce;
use crate::error::{FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::record::FieldValue;
use crate::validation::ValidationContext;

use super::text::TextSchema;
use super::traits::{finish, SchemaLike};

#[derive(Clone)]
enum ListConstraint {
    MinLength { min: usize, message: Option<String> },
    MaxLength { max: usize, message: Option<String> },
    Unique { message: Option<String> },
}

/// Schema for list fields.
///
/// # Example
///
/// ```rust
/// use recordkit::Schema;
/// use serde_json::json;
///
/// let allergies = Schema::list(Schema::text().min_len(1)).max_len(10).unique();
///
/// assert!(allergies.validate(&json!(["pollen", "dust"])).is_success());
///
/// let errors = allergies.validate(&json!(["dust", ""])).into_result().unwrap_err();
/// assert_eq!(errors.first().path.to_string(), "[1]");
/// ```
#[derive(Clone)]
pub struct ListSchema<S = TextSchema> {
    item_schema: S,
    constraints: Vec<ListConstraint>,
    type_error_message: Option<String>,
}

impl<S: SchemaLike> ListSchema<S> {
    pub fn new(item_schema: S) -> Self {
        Self {
            item_schema,
            constraints: Vec::new(),
            type_error_message: None,
        }
    }

    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(ListConstraint::MinLength { min, message: None });
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(ListConstraint::MaxLength { max, message: None });
        self
    }

    pub fn non_empty(self) -> Self {
        self.min_len(1)
    }

    /// No two items may be equal after item validation.
    pub fn unique(mut self) -> Self {
        self.constraints.push(ListConstraint::Unique { message: None });
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.constraints.last_mut() {
            Some(
                ListConstraint::MinLength { message: m, .. }
                | ListConstraint::MaxLength { message: m, .. }
                | ListConstraint::Unique { message: m },
            ) => *m = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    pub fn validate(&self, value: &Value) -> Validation<Vec<Value>, FieldErrors> {
        self.validate_with(value, &FieldPath::root(), &ValidationContext::default())
    }

    fn check_length(&self, len: usize, path: &FieldPath) -> Vec<FieldError> {
        self.constraints
            .iter()
            .filter_map(|c| match c {
                ListConstraint::MinLength { min, message } if len < *min => Some(
                    FieldError::constraint(
                        path.clone(),
                        "min_length",
                        message
                            .clone()
                            .unwrap_or_else(|| format!("list must have at least {} items, got {}", min, len)),
                    )
                    .with_expected(format!("at least {} items", min))
                    .with_got(format!("{} items", len)),
                ),
                ListConstraint::MaxLength { max, message } if len > *max => Some(
                    FieldError::constraint(
                        path.clone(),
                        "max_length",
                        message
                            .clone()
                            .unwrap_or_else(|| format!("list must have at most {} items, got {}", max, len)),
                    )
                    .with_expected(format!("at most {} items", max))
                    .with_got(format!("{} items", len)),
                ),
                _ => None,
            })
            .collect()
    }

    fn check_unique(&self, items: &[Value], path: &FieldPath) -> Vec<FieldError> {
        let Some(message) = self.constraints.iter().find_map(|c| match c {
            ListConstraint::Unique { message } => Some(message),
            _ => None,
        }) else {
            return Vec::new();
        };

        // Keyed by the index of each value's first occurrence.
        let mut seen: IndexMap<usize, Vec<usize>> = IndexMap::new();
        for (i, item) in items.iter().enumerate() {
            let first = items[..i].iter().position(|p| p == item).unwrap_or(i);
            seen.entry(first).or_default().push(i);
        }
        seen.into_iter()
            .filter(|(_, indices)| indices.len() > 1)
            .map(|(first, indices)| {
                FieldError::constraint(
                    path.clone(),
                    "unique",
                    message
                        .clone()
                        .unwrap_or_else(|| format!("duplicate value {} at indices {:?}", items[first], indices)),
                )
                .with_got(format!("duplicates at indices {:?}", indices))
            })
            .collect()
    }
}

impl<S: SchemaLike> ListSchema<S> {
    fn validate_items(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Vec<FieldValue>, FieldErrors> {
        let arr = match coerce::to_list(value, path) {
            Ok(a) => a,
            Err(e) => {
                let e = match &self.type_error_message {
                    Some(m) => e.with_message(m.clone()),
                    None => e,
                };
                return Validation::Failure(FieldErrors::single(e));
            }
        };

        let mut errors = self.check_length(arr.len(), path);
        let mut items = Vec::with_capacity(arr.len());
        for (index, item) in arr.iter().enumerate() {
            match self
                .item_schema
                .validate_field(item, &path.push_index(index), ctx)
            {
                Validation::Success(v) => items.push(v),
                Validation::Failure(e) => errors.extend(e),
            }
        }
        if items.len() == arr.len() {
            let values: Vec<Value> = items.iter().map(FieldValue::to_value).collect();
            errors.extend(self.check_unique(&values, path));
        }
        finish(items, errors)
    }
}

impl<S: SchemaLike> SchemaLike for ListSchema<S> {
    type Output = Vec<Value>;

    fn validate_with(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Vec<Value>, FieldErrors> {
        self.validate_items(value, path, ctx)
            .map(|items| items.into_iter().map(FieldValue::into_value).collect())
    }

    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors> {
        self.validate_with(value, path, ctx).map(Value::Array)
    }

    fn validate_field(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<FieldValue, FieldErrors> {
        self.validate_items(value, path, ctx).map(FieldValue::list)
    }

    fn verify(&self) -> Result<(), crate::error::DefinitionError> {
        self.item_schema.verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::numeric::IntegerSchema;
    use crate::schema::{MapSchema, RecordSchema};
    use serde_json::json;

    fn unwrap_failure<T: std::fmt::Debug>(v: Validation<T, FieldErrors>) -> FieldErrors {
        v.into_result().unwrap_err()
    }

    #[test]
    fn test_rejects_non_list() {
        let errors = unwrap_failure(ListSchema::new(TextSchema::new()).validate(&json!("pollen")));
        assert_eq!(errors.first().code, "invalid_type");
        assert_eq!(errors.first().expected.as_deref(), Some("array"));
    }

    #[test]
    fn test_item_errors_have_indices() {
        let schema = ListSchema::new(TextSchema::new());
        let errors = unwrap_failure(schema.validate(&json!(["a", 2, "c", false])));
        let paths: Vec<_> = errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);
    }

    #[test]
    fn test_items_are_coerced() {
        let schema = ListSchema::new(IntegerSchema::new());
        let items = schema.validate(&json!(["1", 2])).into_result().unwrap();
        assert_eq!(items, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_unique_compares_coerced_items() {
        let schema = ListSchema::new(IntegerSchema::new()).unique();
        let errors = unwrap_failure(schema.validate(&json!(["1", 1, 2])));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().code, "unique");
        assert_eq!(errors.first().got.as_deref(), Some("duplicates at indices [0, 1]"));
    }

    #[test]
    fn test_unique_ignores_key_order() {
        let schema = ListSchema::new(MapSchema::new(IntegerSchema::new())).unique();
        let errors = unwrap_failure(schema.validate(&json!([
            {"a": 1, "b": 2},
            {"c": 3},
            {"b": 2, "a": 1}
        ])));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().got.as_deref(), Some("duplicates at indices [0, 2]"));
    }

    #[test]
    fn test_records_survive_as_field_values() {
        let schema = ListSchema::new(RecordSchema::new().field("sku", TextSchema::new()));
        let value = SchemaLike::validate_field(&schema, &json!([{"sku": "A1"}]), &FieldPath::root(), &ValidationContext::default())
            .into_result()
            .unwrap();
        assert!(matches!(value, FieldValue::List(ref items) if matches!(items[0], FieldValue::Nested(_))));

        let plain = SchemaLike::validate_field(&ListSchema::new(TextSchema::new()), &json!(["a"]), &FieldPath::root(), &ValidationContext::default())
            .into_result()
            .unwrap();
        assert_eq!(plain, FieldValue::Plain(json!(["a"])));
    }

    #[test]
    fn test_length_and_item_errors_together() {
        let schema = ListSchema::new(TextSchema::new()).max_len(1);
        let errors = unwrap_failure(schema.validate(&json!(["a", 1])));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.with_code("max_length").len(), 1);
    }

    #[test]
    fn test_non_empty_custom_message() {
        let schema = ListSchema::new(TextSchema::new()).non_empty().error("need at least one tag");
        let errors = unwrap_failure(schema.validate(&json!([])));
        assert_eq!(errors.first().message, "need at least one tag");
    }
}
