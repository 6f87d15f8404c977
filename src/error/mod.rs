//! Error types for record validation and schema definition.
//!
//! Validation failures are reported as [`FieldErrors`], a non-empty collection
//! of [`FieldError`]s that is always complete: every field and rule that
//! failed is listed, not just the first. Mistakes in a schema itself are
//! [`DefinitionError`]s and surface when the schema is built or registered.

mod definition;
mod field_error;

pub use definition::{DefinitionError, RecordError};
pub use field_error::{ErrorKind, FieldError, FieldErrors};
