//! Tests for sharing schemas and the registry across threads.

use recordkit::{RecordSchema, Schema, SchemaRegistry};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn patient() -> RecordSchema {
    Schema::record()
        .field("name", Schema::text().min_len(1).to_uppercase())
        .field("age", Schema::integer().gt(0).lt(120))
        .optional("contact", Schema::text_map())
        .rule("senior_contact", |r| {
            if r.get_i64("age").unwrap_or(0) > 60 && !r.is_present("contact") {
                Err("age over 60 requires contact".to_string())
            } else {
                Ok(())
            }
        })
}

#[test]
fn test_shared_schema_across_threads() {
    let schema = Arc::new(patient());

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || {
                let age = 20 + i * 5;
                let result = schema.validate(&json!({"name": format!("patient {}", i), "age": age}));
                assert_eq!(result.is_success(), age <= 60);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_registration_and_validation() {
    let registry = SchemaRegistry::new();
    registry.register("Patient", patient()).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                registry
                    .register(format!("Extra{}", i), Schema::record().field("id", Schema::integer()))
                    .unwrap();
                let result = registry
                    .validate("Patient", &json!({"name": "asha", "age": 30}))
                    .unwrap();
                assert!(result.is_success());
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(registry.names().len(), 9);
}

#[test]
fn test_records_are_send() {
    let record = patient().parse(&json!({"name": "asha", "age": 30})).unwrap();
    let name = thread::spawn(move || record.get_str("name").map(str::to_string))
        .join()
        .unwrap();
    assert_eq!(name.as_deref(), Some("ASHA"));
}
