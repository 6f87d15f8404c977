//! Tests for error reporting and accumulation.

use recordkit::{ErrorKind, FieldError, FieldErrors, FieldPath, RecordError, Schema};
use serde_json::json;
use stillwater::prelude::*;

#[test]
fn test_errors_combine_in_order() {
    let a = FieldErrors::single(FieldError::constraint(FieldPath::from_field("name"), "required", "missing"));
    let b = FieldErrors::single(FieldError::constraint(FieldPath::from_field("age"), "required", "missing"));
    let combined = a.combine(b);
    let paths: Vec<String> = combined.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["name", "age"]);
}

#[test]
fn test_display_lists_every_error() {
    let schema = Schema::record()
        .field("name", Schema::text().min_len(1))
        .field("age", Schema::integer().lt(120));
    let errors = schema.parse(&json!({"name": "", "age": 200})).unwrap_err();

    let text = errors.to_string();
    assert!(text.starts_with("validation failed with 2 error(s):"));
    assert!(text.contains("1. [constraint violation] name:"));
    assert!(text.contains("2. [constraint violation] age: must be less than 120, got 200"));
}

#[test]
fn test_type_mismatch_details() {
    let errors = Schema::record()
        .field("age", Schema::integer())
        .parse(&json!({"age": [1]}))
        .unwrap_err();
    let error = errors.first();
    assert_eq!(error.kind, ErrorKind::TypeMismatch);
    assert_eq!(error.expected.as_deref(), Some("integer"));
    assert_eq!(error.got.as_deref(), Some("[1]"));
    assert_eq!(error.to_string(), "age: expected integer, got array (expected: integer) (got: [1])");
}

#[test]
fn test_long_values_are_truncated_in_reports() {
    let long = "x".repeat(500);
    let errors = Schema::record()
        .field("age", Schema::integer())
        .parse(&json!({ "age": long }))
        .unwrap_err();
    let got = errors.first().got.clone().unwrap();
    assert!(got.ends_with("..."));
    assert!(got.len() < 100);
}

#[test]
fn test_custom_messages() {
    let schema = Schema::record()
        .field("age", Schema::integer().error("age must be a whole number"))
        .field("name", Schema::text().min_len(2).error("name is too short"));
    let errors = schema.parse(&json!({"age": "old", "name": "A"})).unwrap_err();
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["age must be a whole number", "name is too short"]);
}

#[test]
fn test_errors_are_std_errors() {
    fn boxed(e: impl std::error::Error + Send + Sync + 'static) -> Box<dyn std::error::Error + Send + Sync> {
        Box::new(e)
    }
    let errors = Schema::record()
        .field("x", Schema::integer())
        .parse(&json!({}))
        .unwrap_err();
    let err = boxed(errors);
    assert!(err.to_string().contains("required field 'x' is missing"));
}

#[test]
fn test_record_error_from_json_text() {
    let schema = Schema::record().field("title", Schema::text());
    match schema.validate_json("[1, 2").unwrap_err() {
        RecordError::Json(e) => assert!(e.is_eof()),
        other => panic!("expected JSON error, got {other}"),
    }
    let err = schema.validate_json(r#"{"title": 5}"#).unwrap_err();
    assert!(err.to_string().starts_with("validation failed with 1 error(s):"));
}
