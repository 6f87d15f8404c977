//! Integer and float field schemas.
//!
//! Both share one set of bound constraints. Coercion follows the context's
//! [`CoercionMode`] unless the schema pins its own with `strict()` or `mode()`.

use std::fmt::Display;
use std::ops::RangeInclusive;

use serde_json::{Number, Value};
use stillwater::Validation;

use crate::coerce;
use crate::error::{FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::validation::{CoercionMode, ValidationContext};

use super::traits::{finish, SchemaLike};

#[derive(Clone)]
enum Bound<T> {
    Min { value: T, message: Option<String> },
    Max { value: T, message: Option<String> },
    Gt { value: T, message: Option<String> },
    Lt { value: T, message: Option<String> },
    Positive { message: Option<String> },
    NonNegative { message: Option<String> },
}

impl<T> Bound<T> {
    fn message_slot(&mut self) -> &mut Option<String> {
        match self {
            Bound::Min { message, .. }
            | Bound::Max { message, .. }
            | Bound::Gt { message, .. }
            | Bound::Lt { message, .. }
            | Bound::Positive { message }
            | Bound::NonNegative { message } => message,
        }
    }
}

fn check_bound<T>(bound: &Bound<T>, value: T, zero: T, path: &FieldPath) -> Option<FieldError>
where
    T: PartialOrd + Display + Copy,
{
    let (ok, code, expected, message) = match bound {
        Bound::Min { value: min, message } => (value >= *min, "min_value", format!("at least {}", min), message),
        Bound::Max { value: max, message } => (value <= *max, "max_value", format!("at most {}", max), message),
        Bound::Gt { value: gt, message } => (value > *gt, "greater_than", format!("greater than {}", gt), message),
        Bound::Lt { value: lt, message } => (value < *lt, "less_than", format!("less than {}", lt), message),
        Bound::Positive { message } => (value > zero, "positive", "value > 0".to_string(), message),
        Bound::NonNegative { message } => (value >= zero, "non_negative", "value >= 0".to_string(), message),
    };
    if ok {
        return None;
    }
    let text = message
        .clone()
        .unwrap_or_else(|| format!("must be {}, got {}", expected.trim_start_matches("value "), value));
    Some(
        FieldError::constraint(path.clone(), code, text)
            .with_expected(expected)
            .with_got(value.to_string()),
    )
}

/// Schema for 64-bit integer fields.
///
/// # Example
///
/// ```rust
/// use recordkit::Schema;
/// use serde_json::json;
///
/// let age = Schema::integer().gt(0).lt(120);
///
/// // Numeric strings are coerced in the default lax mode.
/// assert_eq!(age.validate(&json!("30")).into_result().unwrap(), 30);
/// assert!(age.validate(&json!(130)).is_failure());
/// assert!(age.clone().strict().validate(&json!("30")).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct IntegerSchema {
    bounds: Vec<Bound<i64>>,
    mode: Option<CoercionMode>,
    type_error_message: Option<String>,
}

impl IntegerSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inclusive lower bound.
    pub fn min(mut self, value: i64) -> Self {
        self.bounds.push(Bound::Min { value, message: None });
        self
    }

    /// Inclusive upper bound.
    pub fn max(mut self, value: i64) -> Self {
        self.bounds.push(Bound::Max { value, message: None });
        self
    }

    pub fn range(self, range: RangeInclusive<i64>) -> Self {
        self.min(*range.start()).max(*range.end())
    }

    /// Exclusive lower bound.
    pub fn gt(mut self, value: i64) -> Self {
        self.bounds.push(Bound::Gt { value, message: None });
        self
    }

    /// Exclusive upper bound.
    pub fn lt(mut self, value: i64) -> Self {
        self.bounds.push(Bound::Lt { value, message: None });
        self
    }

    pub fn positive(mut self) -> Self {
        self.bounds.push(Bound::Positive { message: None });
        self
    }

    pub fn non_negative(mut self) -> Self {
        self.bounds.push(Bound::NonNegative { message: None });
        self
    }

    /// Accept only JSON integers, whatever the surrounding mode.
    pub fn strict(self) -> Self {
        self.mode(CoercionMode::Strict)
    }

    pub fn mode(mut self, mode: CoercionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Overrides the message of the most recent bound, or of the type error
    /// if no bound has been added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.bounds.last_mut() {
            Some(last) => *last.message_slot() = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    pub fn validate(&self, value: &Value) -> Validation<i64, FieldErrors> {
        self.validate_with(value, &FieldPath::root(), &ValidationContext::default())
    }
}

impl SchemaLike for IntegerSchema {
    type Output = i64;

    fn validate_with(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<i64, FieldErrors> {
        let mode = self.mode.unwrap_or(ctx.mode());
        let n = match coerce::to_integer(value, mode, path) {
            Ok(n) => n,
            Err(e) => return type_failure(e, &self.type_error_message),
        };
        let errors = self
            .bounds
            .iter()
            .filter_map(|b| check_bound(b, n, 0, path))
            .collect();
        finish(n, errors)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors> {
        self.validate_with(value, path, ctx).map(|n| Value::Number(n.into()))
    }
}

/// Schema for floating-point fields.
///
/// Integers are always accepted as floats; numeric strings only in lax mode.
#[derive(Clone, Default)]
pub struct FloatSchema {
    bounds: Vec<Bound<f64>>,
    mode: Option<CoercionMode>,
    type_error_message: Option<String>,
}

impl FloatSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min(mut self, value: f64) -> Self {
        self.bounds.push(Bound::Min { value, message: None });
        self
    }

    pub fn max(mut self, value: f64) -> Self {
        self.bounds.push(Bound::Max { value, message: None });
        self
    }

    pub fn gt(mut self, value: f64) -> Self {
        self.bounds.push(Bound::Gt { value, message: None });
        self
    }

    pub fn lt(mut self, value: f64) -> Self {
        self.bounds.push(Bound::Lt { value, message: None });
        self
    }

    pub fn positive(mut self) -> Self {
        self.bounds.push(Bound::Positive { message: None });
        self
    }

    pub fn strict(self) -> Self {
        self.mode(CoercionMode::Strict)
    }

    pub fn mode(mut self, mode: CoercionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.bounds.last_mut() {
            Some(last) => *last.message_slot() = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    pub fn validate(&self, value: &Value) -> Validation<f64, FieldErrors> {
        self.validate_with(value, &FieldPath::root(), &ValidationContext::default())
    }
}

impl SchemaLike for FloatSchema {
    type Output = f64;

    fn validate_with(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<f64, FieldErrors> {
        let mode = self.mode.unwrap_or(ctx.mode());
        let f = match coerce::to_float(value, mode, path) {
            Ok(f) => f,
            Err(e) => return type_failure(e, &self.type_error_message),
        };
        let errors = self
            .bounds
            .iter()
            .filter_map(|b| check_bound(b, f, 0.0, path))
            .collect();
        finish(f, errors)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors> {
        // Coerced floats are finite, so `from_f64` only fails for NaN/inf.
        self.validate_with(value, path, ctx)
            .map(|f| Number::from_f64(f).map_or(Value::Null, Value::Number))
    }
}

fn type_failure<T>(error: FieldError, custom: &Option<String>) -> Validation<T, FieldErrors> {
    let error = match custom {
        Some(m) => error.with_message(m.clone()),
        None => error,
    };
    Validation::Failure(FieldErrors::single(error))
}
