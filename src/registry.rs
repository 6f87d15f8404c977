//! Named storage for record schemas.
//!
//! A [`SchemaRegistry`] holds verified record schemas under string names so
//! that callers can validate by name, singly or in parallel batches.

use parking_lot::RwLock;
use rayon::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::Validation;
use tracing::{debug, warn};

use crate::error::{DefinitionError, FieldErrors};
use crate::path::FieldPath;
use crate::record::Record;
use crate::schema::{RecordSchema, SchemaLike};
use crate::validation::{CoercionMode, ValidationContext};

type SchemaMap = Arc<RwLock<HashMap<String, Arc<RecordSchema>>>>;

/// A thread-safe registry of named record schemas.
///
/// Clones share the same storage. Lookups and validation take a read lock
/// only long enough to clone the schema handle, so validation never blocks
/// registration.
///
/// # Example
///
/// ```rust
/// use recordkit::{Schema, SchemaRegistry};
/// use serde_json::json;
///
/// let registry = SchemaRegistry::new();
/// registry
///     .register("Book", Schema::record().field("title", Schema::text().min_len(1)))
///     .unwrap();
///
/// let result = registry.validate("Book", &json!({"title": "Dune"})).unwrap();
/// assert!(result.is_success());
///
/// assert!(registry.validate("Film", &json!({})).is_err());
/// ```
pub struct SchemaRegistry {
    schemas: SchemaMap,
    context: ValidationContext,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: Arc::new(RwLock::new(HashMap::new())),
            context: ValidationContext::default(),
        }
    }

    /// Sets the nesting limit used for validation through this registry.
    /// Defaults to [`DEFAULT_MAX_DEPTH`](crate::validation::DEFAULT_MAX_DEPTH).
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.context = self.context.with_max_depth(depth);
        self
    }

    /// Sets the coercion mode for fields that do not pick their own.
    pub fn with_mode(mut self, mode: CoercionMode) -> Self {
        self.context = self.context.with_mode(mode);
        self
    }

    /// Verifies `schema` and stores it under `name`.
    ///
    /// # Errors
    ///
    /// `RegistryError::Definition` if the schema fails [`RecordSchema::verify`],
    /// `RegistryError::DuplicateName` if the name is taken.
    pub fn register(&self, name: impl Into<String>, schema: RecordSchema) -> Result<(), RegistryError> {
        let name = name.into();
        schema.verify().inspect_err(|e| {
            warn!(schema = %name, error = %e, "rejected schema definition");
        })?;

        let mut schemas = self.schemas.write();
        if schemas.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        debug!(schema = %name, fields = schema.field_names().count(), "registered schema");
        schemas.insert(name, Arc::new(schema));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<RecordSchema>> {
        self.schemas.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.schemas.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn lookup(&self, name: &str) -> Result<Arc<RecordSchema>, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::SchemaNotFound(name.to_string()))
    }

    /// Validates `value` against the schema registered as `schema_name`.
    ///
    /// # Errors
    ///
    /// `RegistryError::SchemaNotFound` if the name is not registered. Invalid
    /// data is not an error here; it is the `Failure` side of the result.
    pub fn validate(
        &self,
        schema_name: &str,
        value: &Value,
    ) -> Result<Validation<Record, FieldErrors>, RegistryError> {
        let schema = self.lookup(schema_name)?;
        Ok(schema.validate_with(value, &FieldPath::root(), &self.context))
    }

    /// Validates many inputs in parallel. Results keep the input order.
    ///
    /// ```rust
    /// use recordkit::{Schema, SchemaRegistry};
    /// use serde_json::json;
    ///
    /// let registry = SchemaRegistry::new();
    /// registry.register("Age", Schema::record().field("age", Schema::integer().gt(0))).unwrap();
    ///
    /// let inputs = vec![json!({"age": 30}), json!({"age": -1}), json!({"age": "7"})];
    /// let results = registry.validate_batch("Age", &inputs).unwrap();
    /// let ok: Vec<bool> = results.iter().map(|r| r.is_success()).collect();
    /// assert_eq!(ok, vec![true, false, true]);
    /// ```
    pub fn validate_batch(
        &self,
        schema_name: &str,
        values: &[Value],
    ) -> Result<Vec<Validation<Record, FieldErrors>>, RegistryError> {
        let schema = self.lookup(schema_name)?;
        let ctx = self.context;
        let results: Vec<_> = values
            .par_iter()
            .map(|value| schema.validate_with(value, &FieldPath::root(), &ctx))
            .collect();
        debug!(
            schema = schema_name,
            total = results.len(),
            failed = results.iter().filter(|r| r.is_failure()).count(),
            "batch validated"
        );
        Ok(results)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SchemaRegistry {
    fn clone(&self) -> Self {
        Self {
            schemas: Arc::clone(&self.schemas),
            context: self.context,
        }
    }
}

/// Errors from registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("schema '{0}' already registered")]
    DuplicateName(String),

    #[error("schema '{0}' not found")]
    SchemaNotFound(String),

    #[error("invalid schema definition: {0}")]
    Definition(#[from] DefinitionError),
}
