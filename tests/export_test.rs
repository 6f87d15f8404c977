//! Tests for exporting records back to mappings and JSON text.

use recordkit::{ExportOptions, Record, RecordSchema, Schema, UnknownFields};
use serde_json::json;

fn profile() -> RecordSchema {
    Schema::record()
        .field("name", Schema::text())
        .optional("nickname", Schema::text())
        .default("married", Schema::boolean(), json!(false))
        .unwrap()
        .field(
            "address",
            Schema::record()
                .field("city", Schema::text())
                .default("country", Schema::text(), json!("IN"))
                .unwrap(),
        )
        .field("weight", Schema::float())
        .field("height", Schema::float())
        .derived("bmi", ["weight", "height"], |r| {
            let bmi = r.get_f64("weight")? / r.get_f64("height")?.powi(2);
            Some(json!((bmi * 100.0).round() / 100.0))
        })
        .unwrap()
}

fn sample() -> Record {
    profile()
        .parse(&json!({
            "name": "Asha",
            "nickname": null,
            "address": {"city": "Pune"},
            "weight": 70,
            "height": 1.75
        }))
        .unwrap()
}

#[test]
fn test_full_export_keeps_declaration_order() {
    let exported = sample().export(&ExportOptions::default());
    let keys: Vec<&str> = exported.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["name", "nickname", "married", "address", "weight", "height", "bmi"]
    );
    assert_eq!(exported["address"], json!({"city": "Pune", "country": "IN"}));
}

#[test]
fn test_omit_defaults_applies_to_nested_records() {
    let exported = sample().export(&ExportOptions::new().omit_defaults());
    assert!(!exported.contains_key("married"));
    assert_eq!(exported["address"], json!({"city": "Pune"}));
}

#[test]
fn test_omit_defaults_reaches_records_in_lists_and_maps() {
    let line = Schema::record()
        .field("sku", Schema::text())
        .optional("note", Schema::text())
        .default("qty", Schema::integer().positive(), json!(1))
        .unwrap();
    let order = Schema::record()
        .field("lines", Schema::list(line.clone()))
        .optional("by_bin", Schema::map(line));

    let record = order
        .parse(&json!({
            "lines": [{"sku": "A1"}, {"sku": "B2", "qty": 3, "note": null}],
            "by_bin": {"b1": {"sku": "C3"}}
        }))
        .unwrap();

    let lines = record.records("lines").unwrap();
    assert_eq!(lines.len(), 2);
    assert!(!lines[0].was_supplied("qty"));
    assert!(lines[1].was_supplied("qty"));

    let exported = record.export(&ExportOptions::new().omit_defaults().omit_null());
    assert_eq!(exported["lines"], json!([{"sku": "A1"}, {"sku": "B2", "qty": 3}]));
    assert_eq!(exported["by_bin"], json!({"b1": {"sku": "C3"}}));

    let full = record.to_value();
    assert_eq!(full["lines"][0], json!({"sku": "A1", "qty": 1}));
}

#[test]
fn test_omit_null_and_derived() {
    let exported = sample().export(&ExportOptions::new().omit_null().without_derived());
    assert!(!exported.contains_key("nickname"));
    assert!(!exported.contains_key("bmi"));
    assert!(exported.contains_key("married"));
}

#[test]
fn test_include_and_exclude_are_top_level() {
    let exported = sample().export(&ExportOptions::new().include(["name", "address", "bmi"]).exclude(["bmi"]));
    let keys: Vec<&str> = exported.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["name", "address"]);
    assert_eq!(exported["address"]["city"], json!("Pune"));
}

#[test]
fn test_json_text_export() {
    let text = sample()
        .to_json_string(&ExportOptions::new().include(["name", "married"]))
        .unwrap();
    assert_eq!(text, r#"{"name":"Asha","married":false}"#);
}

#[test]
fn test_options_from_config() {
    let opts: ExportOptions = serde_json::from_value(json!({
        "omit_defaults": true,
        "include_derived": false
    }))
    .unwrap();
    let exported = sample().export(&opts);
    assert!(!exported.contains_key("married"));
    assert!(!exported.contains_key("bmi"));
    assert!(exported.contains_key("nickname"));
}

#[test]
fn test_exported_record_validates_again() {
    let schema = profile().unknown_fields(UnknownFields::Forbid);
    let first = schema
        .parse(&json!({"name": "Asha", "address": {"city": "Pune"}, "weight": 70, "height": 1.75}))
        .unwrap();
    let exported = first.export(&ExportOptions::new().without_derived());
    let second = schema.parse(&serde_json::Value::Object(exported)).unwrap();
    assert_eq!(first.get("bmi"), second.get("bmi"));
    assert_eq!(first.to_value(), second.to_value());
}
