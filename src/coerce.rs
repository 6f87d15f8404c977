//! Conversion of raw JSON values to declared scalar types.
//!
//! Every function here is pure. Under [`CoercionMode::Strict`] only values of
//! the exact JSON type are accepted; under [`CoercionMode::Lax`] a small set of
//! unambiguous conversions is allowed as well.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::FieldError;
use crate::path::FieldPath;
use crate::validation::CoercionMode;

/// Returns the JSON type name for a value.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Renders the offending value for error reports, truncating long input.
pub(crate) fn render(value: &Value) -> String {
    const LIMIT: usize = 64;
    let text = value.to_string();
    if text.chars().count() > LIMIT {
        let cut: String = text.chars().take(LIMIT).collect();
        format!("{}...", cut)
    } else {
        text
    }
}

fn mismatch(path: &FieldPath, expected: &str, value: &Value) -> FieldError {
    FieldError::type_mismatch(
        path.clone(),
        format!("expected {}, got {}", expected, value_type_name(value)),
        expected,
    )
    .with_got(render(value))
}

pub fn to_integer(value: &Value, mode: CoercionMode, path: &FieldPath) -> Result<i64, FieldError> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(i);
            }
            if let Some(u) = n.as_u64() {
                return Err(FieldError::type_mismatch(
                    path.clone(),
                    "integer value too large",
                    "integer in i64 range",
                )
                .with_code("overflow")
                .with_got(u.to_string()));
            }
            match (mode, n.as_f64()) {
                (CoercionMode::Lax, Some(f)) if f.fract() == 0.0 && in_i64_range(f) => {
                    trace!(%path, from = f, "coerced float to integer");
                    Ok(f as i64)
                }
                _ => Err(mismatch(path, "integer", value)),
            }
        }
        Value::String(s) if mode == CoercionMode::Lax => match s.trim().parse::<i64>() {
            Ok(i) => {
                trace!(%path, from = %s, "coerced string to integer");
                Ok(i)
            }
            Err(_) => Err(mismatch(path, "integer", value)),
        },
        _ => Err(mismatch(path, "integer", value)),
    }
}

fn in_i64_range(f: f64) -> bool {
    f >= i64::MIN as f64 && f < i64::MAX as f64
}

pub fn to_float(value: &Value, mode: CoercionMode, path: &FieldPath) -> Result<f64, FieldError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch(path, "float", value)),
        Value::String(s) if mode == CoercionMode::Lax => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => {
                trace!(%path, from = %s, "coerced string to float");
                Ok(f)
            }
            _ => Err(mismatch(path, "float", value)),
        },
        _ => Err(mismatch(path, "float", value)),
    }
}

pub fn to_bool(value: &Value, mode: CoercionMode, path: &FieldPath) -> Result<bool, FieldError> {
    if let Value::Bool(b) = value {
        return Ok(*b);
    }
    if mode == CoercionMode::Strict {
        return Err(mismatch(path, "boolean", value));
    }
    let coerced = match value {
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    };
    match coerced {
        Some(b) => {
            trace!(%path, from = %value, "coerced value to boolean");
            Ok(b)
        }
        None => Err(mismatch(path, "boolean", value)),
    }
}

/// Text is never synthesised from other types, in either mode.
pub fn to_text<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a str, FieldError> {
    value.as_str().ok_or_else(|| mismatch(path, "string", value))
}

pub fn to_list<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a Vec<Value>, FieldError> {
    value.as_array().ok_or_else(|| mismatch(path, "array", value))
}

pub fn to_object<'a>(
    value: &'a Value,
    path: &FieldPath,
    expected: &str,
) -> Result<&'a Map<String, Value>, FieldError> {
    value.as_object().ok_or_else(|| mismatch(path, expected, value))
}
