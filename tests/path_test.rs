//! Tests for error paths produced by nested validation.

use recordkit::{FieldPath, PathSegment, Schema};
use serde_json::json;

#[test]
fn test_paths_through_lists_of_records() {
    let schema = Schema::record().field(
        "visits",
        Schema::list(
            Schema::record()
                .field("date", Schema::text().pattern(r"^\d{4}-\d{2}-\d{2}$").unwrap())
                .field("fee", Schema::float().positive()),
        ),
    );

    let errors = schema
        .parse(&json!({"visits": [
            {"date": "2024-01-02", "fee": 10},
            {"date": "yesterday", "fee": -5}
        ]}))
        .unwrap_err();

    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert_eq!(paths, vec!["visits[1].date", "visits[1].fee"]);

    let visit = FieldPath::from_field("visits").push_index(1);
    assert!(errors.iter().all(|e| e.path.starts_with(&visit)));
    assert_eq!(errors.first().path.parent(), Some(visit));
}

#[test]
fn test_mapping_value_paths() {
    let schema = Schema::record().optional("contact", Schema::map(Schema::text().min_len(3)));
    let errors = schema
        .parse(&json!({"contact": {"phone": "55", "email": "a@b.co"}}))
        .unwrap_err();
    let error = errors.first();
    assert_eq!(error.path.to_string(), "contact.phone");
    assert_eq!(error.path.top_field(), Some("contact"));
    assert_eq!(error.path.last(), Some(&PathSegment::field("phone")));
}

#[test]
fn test_record_level_errors_sit_at_the_record() {
    let schema = Schema::record()
        .optional("a", Schema::integer())
        .optional("b", Schema::integer())
        .at_least_one_of(["a", "b"])
        .unwrap();
    let errors = schema.parse(&json!({})).unwrap_err();
    assert!(errors.first().path.is_root());
    assert_eq!(errors.at_path(&FieldPath::root()).len(), 1);
}
