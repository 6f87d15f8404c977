//! Schema definitions for record validation.
//!
//! Field schemas coerce and check one value each; [`RecordSchema`] combines
//! them into a record with rules and derived fields. Every schema accumulates
//! all of its errors rather than stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use recordkit::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::text().min_len(1).max_len(50);
//!
//! assert!(schema.validate(&json!("Asha")).is_success());
//! assert!(schema.validate(&json!("")).is_failure());
//! ```

mod boolean;
mod list;
mod map;
mod numeric;
mod record;
mod rules;
mod text;
mod traits;

pub use boolean::BoolSchema;
pub use list::ListSchema;
pub use map::MapSchema;
pub use numeric::{FloatSchema, IntegerSchema};
pub use record::{RecordSchema, UnknownFields};
pub use text::TextSchema;
pub use traits::{FieldValidator, SchemaLike};

/// Entry point for creating schemas.
///
/// Each factory returns a builder; chain constraint methods onto it.
///
/// ```rust
/// use recordkit::Schema;
/// use serde_json::json;
///
/// let book = Schema::record()
///     .field("title", Schema::text().min_len(1))
///     .field("price", Schema::float().positive())
///     .default("tags", Schema::text_list().unique(), json!([]))
///     .unwrap();
///
/// let record = book.parse(&json!({"title": "Dune", "price": "9.99"})).unwrap();
/// assert_eq!(record.get_f64("price"), Some(9.99));
/// assert_eq!(record.get_str_list("tags"), Some(vec![]));
/// ```
pub struct Schema;

impl Schema {
    /// Text. Never coerced from other types.
    pub fn text() -> TextSchema {
        TextSchema::new()
    }

    /// Integers. Lax mode accepts whole floats and numeric strings.
    ///
    /// ```rust
    /// use recordkit::Schema;
    /// use serde_json::json;
    ///
    /// let age = Schema::integer().gt(0).lt(120);
    ///
    /// assert!(age.validate(&json!("42")).is_success());
    /// assert!(age.validate(&json!(120)).is_failure());
    /// assert!(age.clone().strict().validate(&json!("42")).is_failure());
    /// ```
    pub fn integer() -> IntegerSchema {
        IntegerSchema::new()
    }

    pub fn float() -> FloatSchema {
        FloatSchema::new()
    }

    pub fn boolean() -> BoolSchema {
        BoolSchema::new()
    }

    pub fn list<S: SchemaLike>(item: S) -> ListSchema<S> {
        ListSchema::new(item)
    }

    /// Shorthand for a list of unconstrained text.
    pub fn text_list() -> ListSchema<TextSchema> {
        ListSchema::new(TextSchema::new())
    }

    pub fn map<S: SchemaLike>(value: S) -> MapSchema<S> {
        MapSchema::new(value)
    }

    pub fn text_map() -> MapSchema<TextSchema> {
        MapSchema::new(TextSchema::new())
    }

    pub fn record() -> RecordSchema {
        RecordSchema::new()
    }
}
