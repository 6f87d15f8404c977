//! # Recordkit
//!
//! Schema-constrained records: declare the fields a record must have, then
//! turn untrusted JSON-like input into a typed, immutable [`Record`] or a
//! complete list of everything that is wrong with it.
//!
//! ## Overview
//!
//! A [`RecordSchema`] is built once from field schemas, record rules and
//! derived fields. Validating input against it:
//!
//! - coerces each field to its declared type (lax by default, see [`CoercionMode`]);
//! - checks every field constraint and collects *all* failures, each tagged
//!   with its [`FieldPath`] and [`ErrorKind`];
//! - runs record rules once the fields are clean;
//! - computes derived fields once the rules pass.
//!
//! Accumulation is built on stillwater's `Validation` type.
//!
//! ## Core Types
//!
//! - [`Schema`]: factory for every schema type
//! - [`RecordSchema`]: the record definition
//! - [`Record`]: a validated record with typed accessors and export
//! - [`FieldErrors`]: a non-empty collection of [`FieldError`]s
//! - [`SchemaRegistry`]: named schemas with batch validation
//!
//! ## Example
//!
//! ```rust
//! use recordkit::{ExportOptions, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::record()
//!     .field("name", Schema::text().min_len(1).max_len(50).to_uppercase())
//!     .field("age", Schema::integer().gt(0).lt(120))
//!     .default("married", Schema::boolean(), json!(false))
//!     .unwrap();
//!
//! let record = schema.parse(&json!({"name": "asha", "age": "34"})).unwrap();
//! assert_eq!(record.get_str("name"), Some("ASHA"));
//! assert_eq!(record.get_i64("age"), Some(34));
//!
//! let exported = record.export(&ExportOptions::new().omit_defaults());
//! assert_eq!(exported.get("married"), None);
//!
//! let errors = schema.parse(&json!({"name": "", "age": 0})).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

pub mod coerce;
pub mod error;
pub mod export;
pub mod path;
pub mod record;
pub mod registry;
pub mod schema;
pub mod validation;

pub use error::{DefinitionError, ErrorKind, FieldError, FieldErrors, RecordError};
pub use export::ExportOptions;
pub use path::{FieldPath, PathSegment};
pub use record::{FieldValue, Origin, Record};
pub use registry::{RegistryError, SchemaRegistry};
pub use schema::{
    BoolSchema, FieldValidator, FloatSchema, IntegerSchema, ListSchema, MapSchema, RecordSchema,
    Schema, SchemaLike, TextSchema, UnknownFields,
};
pub use validation::{CoercionMode, ValidationContext};

/// Result of validating with any schema.
pub type ValidationResult<T> = stillwater::Validation<T, FieldErrors>;
