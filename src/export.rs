//! Export of records back to plain mappings.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::{FieldValue, Origin, Record};

/// Controls which fields [`Record::export`] emits.
///
/// The defaults emit everything. Options can be set with the builder methods
/// or loaded from configuration:
///
/// ```rust
/// use recordkit::ExportOptions;
///
/// let opts: ExportOptions = serde_json::from_str(r#"{"omit_defaults": true, "exclude": ["email"]}"#).unwrap();
/// assert!(opts.omit_defaults);
/// assert!(opts.include_derived);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Skip fields that were filled from their declared default.
    pub omit_defaults: bool,
    /// Skip fields whose value is null.
    pub omit_null: bool,
    pub include_derived: bool,
    /// When set, only these top-level fields are emitted.
    pub include: Option<IndexSet<String>>,
    /// Top-level fields never emitted.
    pub exclude: IndexSet<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            omit_defaults: false,
            omit_null: false,
            include_derived: true,
            include: None,
            exclude: IndexSet::new(),
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn omit_defaults(mut self) -> Self {
        self.omit_defaults = true;
        self
    }

    pub fn omit_null(mut self) -> Self {
        self.omit_null = true;
        self
    }

    pub fn without_derived(mut self) -> Self {
        self.include_derived = false;
        self
    }

    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(names.into_iter().map(Into::into));
        self
    }

    /// Options applied to nested records: field selection stays top-level.
    fn nested(&self) -> Self {
        Self {
            include: None,
            exclude: IndexSet::new(),
            ..self.clone()
        }
    }

    fn keeps(&self, name: &str, value: &Value, origin: Origin) -> bool {
        if self.omit_defaults && origin == Origin::Default {
            return false;
        }
        if self.omit_null && value.is_null() {
            return false;
        }
        if !self.include_derived && origin == Origin::Derived {
            return false;
        }
        if let Some(include) = &self.include {
            if !include.contains(name) {
                return false;
            }
        }
        !self.exclude.contains(name)
    }
}

impl Record {
    /// Exports the record as a plain mapping, filtered by `opts`.
    ///
    /// `omit_defaults`, `omit_null` and `include_derived` also apply inside
    /// nested records, including records held in lists and mappings.
    pub fn export(&self, opts: &ExportOptions) -> Map<String, Value> {
        let nested_opts = opts.nested();
        self.entries()
            .filter(|(name, value, _, origin)| opts.keeps(name, value, *origin))
            .map(|(name, value, nested, _)| {
                let value = match nested {
                    Some(nested) => nested.export(&nested_opts),
                    None => value.clone(),
                };
                (name.to_string(), value)
            })
            .collect()
    }

    pub fn to_json_string(&self, opts: &ExportOptions) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.export(opts))
    }
}

impl FieldValue {
    fn export(&self, opts: &ExportOptions) -> Value {
        match self {
            FieldValue::Plain(value) => value.clone(),
            FieldValue::Nested(record) => Value::Object(record.export(opts)),
            FieldValue::List(items) => Value::Array(items.iter().map(|item| item.export(opts)).collect()),
            FieldValue::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), item.export(opts)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;

    fn sample() -> Record {
        let mut address = Record::new();
        address.insert("city", FieldValue::Plain(json!("Pune")), Origin::Supplied);
        address.insert("country", FieldValue::Plain(json!("IN")), Origin::Default);

        let mut record = Record::new();
        record.insert("name", FieldValue::Plain(json!("ASHA")), Origin::Supplied);
        record.insert("married", FieldValue::Plain(json!(false)), Origin::Default);
        record.insert("nickname", FieldValue::Plain(Value::Null), Origin::Supplied);
        record.insert("address", FieldValue::Nested(address), Origin::Supplied);
        record.insert("bmi", FieldValue::Plain(json!(22.86)), Origin::Derived);
        record
    }

    #[test]
    fn test_default_export_is_complete() {
        let out = sample().export(&ExportOptions::default());
        assert_eq!(out.len(), 5);
        assert_eq!(out["address"], json!({"city": "Pune", "country": "IN"}));
    }

    #[test]
    fn test_omit_defaults_recurses() {
        let out = sample().export(&ExportOptions::new().omit_defaults());
        assert!(!out.contains_key("married"));
        assert_eq!(out["address"], json!({"city": "Pune"}));
    }

    #[test]
    fn test_omit_defaults_reaches_records_in_lists_and_maps() {
        let line = |sku: &str| {
            let mut line = Record::new();
            line.insert("sku", FieldValue::Plain(json!(sku)), Origin::Supplied);
            line.insert("qty", FieldValue::Plain(json!(1)), Origin::Default);
            FieldValue::Nested(line)
        };
        let mut by_bin = IndexMap::new();
        by_bin.insert("b1".to_string(), line("C3"));

        let mut order = Record::new();
        order.insert("lines", FieldValue::list(vec![line("A1"), line("B2")]), Origin::Supplied);
        order.insert("bins", FieldValue::map(by_bin), Origin::Supplied);

        let out = order.export(&ExportOptions::new().omit_defaults());
        assert_eq!(out["lines"], json!([{"sku": "A1"}, {"sku": "B2"}]));
        assert_eq!(out["bins"], json!({"b1": {"sku": "C3"}}));

        let full = order.export(&ExportOptions::default());
        assert_eq!(full["lines"][1], json!({"sku": "B2", "qty": 1}));
    }

    #[test]
    fn test_omit_null_and_derived() {
        let out = sample().export(&ExportOptions::new().omit_null().without_derived());
        assert!(!out.contains_key("nickname"));
        assert!(!out.contains_key("bmi"));
        assert!(out.contains_key("name"));
    }

    #[test]
    fn test_include_and_exclude_are_top_level() {
        let out = sample().export(&ExportOptions::new().include(["name", "address", "bmi"]).exclude(["bmi"]));
        let keys: Vec<_> = out.keys().cloned().collect();
        assert_eq!(keys.len(), 2);
        assert!(out.contains_key("name"));
        assert_eq!(out["address"]["country"], json!("IN"));
    }

    #[test]
    fn test_json_string() {
        let text = sample()
            .to_json_string(&ExportOptions::new().include(["name"]))
            .unwrap();
        assert_eq!(text, r#"{"name":"ASHA"}"#);
    }
}
