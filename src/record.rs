//! Validated, immutable records.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::export::ExportOptions;

/// Where a field's value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Present in the caller's input.
    Supplied,
    /// Filled in from the declared default.
    Default,
    /// Computed from other fields after validation.
    Derived,
    /// An undeclared input key kept by [`UnknownFields::Keep`](crate::UnknownFields::Keep).
    Extra,
}

/// The validated form of a single field, as produced by a field schema.
///
/// Records are kept whole wherever they appear, including inside lists and
/// mappings, so their own origins survive export.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Plain(Value),
    Nested(Record),
    /// A list holding at least one record.
    List(Vec<FieldValue>),
    /// A mapping holding at least one record.
    Map(IndexMap<String, FieldValue>),
}

impl FieldValue {
    /// Builds a list value, flattening to [`FieldValue::Plain`] when no item
    /// holds a record.
    pub(crate) fn list(items: Vec<FieldValue>) -> Self {
        if items.iter().all(FieldValue::is_plain) {
            FieldValue::Plain(Value::Array(items.into_iter().map(FieldValue::into_value).collect()))
        } else {
            FieldValue::List(items)
        }
    }

    /// Mapping counterpart of [`list`](Self::list).
    pub(crate) fn map(entries: IndexMap<String, FieldValue>) -> Self {
        if entries.values().all(FieldValue::is_plain) {
            FieldValue::Plain(Value::Object(
                entries.into_iter().map(|(k, v)| (k, v.into_value())).collect(),
            ))
        } else {
            FieldValue::Map(entries)
        }
    }

    pub fn is_plain(&self) -> bool {
        matches!(self, FieldValue::Plain(_))
    }

    /// The value as plain JSON, with every field of nested records.
    pub fn to_value(&self) -> Value {
        match self {
            FieldValue::Plain(value) => value.clone(),
            FieldValue::Nested(record) => record.to_value(),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_value).collect()),
            FieldValue::Map(entries) => Value::Object(
                entries.iter().map(|(k, v)| (k.clone(), v.to_value())).collect(),
            ),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            FieldValue::Plain(value) => value,
            other => other.to_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    value: Value,
    /// Set only when the value holds records.
    nested: Option<FieldValue>,
    origin: Origin,
}

/// A record that passed every field constraint and record rule.
///
/// Records are only ever produced by [`RecordSchema`](crate::RecordSchema)
/// validation and cannot be modified afterwards, so derived fields always
/// agree with the fields they were computed from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    slots: IndexMap<String, Slot>,
}

impl Record {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: FieldValue, origin: Origin) {
        let slot = match value {
            FieldValue::Plain(value) => Slot {
                value,
                nested: None,
                origin,
            },
            nested => Slot {
                value: nested.to_value(),
                nested: Some(nested),
                origin,
            },
        };
        self.slots.insert(name.into(), slot);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|s| &s.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Returns true if the field exists and is not null.
    pub fn is_present(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Reads a numeric field as `f64`; integer fields convert.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Reads a list of text. `None` if the field is absent or not all text.
    pub fn get_str_list(&self, name: &str) -> Option<Vec<&str>> {
        self.get(name)?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// Reads a text-to-text mapping. `None` if absent or any value is not text.
    pub fn get_str_map(&self, name: &str) -> Option<IndexMap<&str, &str>> {
        self.get(name)?
            .as_object()?
            .iter()
            .map(|(k, v)| v.as_str().map(|v| (k.as_str(), v)))
            .collect()
    }

    /// The nested record stored under `name`, if that field is a record.
    pub fn record(&self, name: &str) -> Option<&Record> {
        match self.slots.get(name)?.nested.as_ref()? {
            FieldValue::Nested(record) => Some(record),
            _ => None,
        }
    }

    /// The records stored in a list-of-records field, in list order.
    pub fn records(&self, name: &str) -> Option<Vec<&Record>> {
        match self.slots.get(name)?.nested.as_ref()? {
            FieldValue::List(items) => items
                .iter()
                .map(|item| match item {
                    FieldValue::Nested(record) => Some(record),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }

    pub fn origin(&self, name: &str) -> Option<Origin> {
        self.slots.get(name).map(|s| s.origin)
    }

    pub fn was_supplied(&self, name: &str) -> bool {
        self.origin(name) == Some(Origin::Supplied)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Fields in declaration order, derived fields last.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.slots.iter().map(|(k, s)| (k.as_str(), &s.value))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    pub fn derived_names(&self) -> impl Iterator<Item = &str> {
        self.slots
            .iter()
            .filter(|(_, s)| s.origin == Origin::Derived)
            .map(|(k, _)| k.as_str())
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &Value, Option<&FieldValue>, Origin)> {
        self.slots
            .iter()
            .map(|(k, s)| (k.as_str(), &s.value, s.nested.as_ref(), s.origin))
    }

    /// Every field, including defaults, derived and nulls, as a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.export(&ExportOptions::default()))
    }

    /// Converts the record into a caller-defined type.
    ///
    /// ```rust
    /// use recordkit::Schema;
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Deserialize)]
    /// struct Book {
    ///     title: String,
    ///     pages: i64,
    /// }
    ///
    /// let schema = Schema::record()
    ///     .field("title", Schema::text())
    ///     .field("pages", Schema::integer().positive());
    ///
    /// let record = schema.parse(&json!({"title": "Dune", "pages": "412"})).unwrap();
    /// let book: Book = record.deserialize_into().unwrap();
    /// assert_eq!(book.pages, 412);
    /// ```
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_value())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.export(&ExportOptions::default()).serialize(serializer)
    }
}
