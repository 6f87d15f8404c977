//! Record schema: the validator that turns raw input into a [`Record`].
//!
//! Validation runs in fixed phases:
//!
//! 1. every declared field is coerced and checked, collecting all errors;
//! 2. record rules run, but only if phase 1 was clean;
//! 3. derived fields are computed, but only if phase 2 was clean.
//!
//! A [`Record`] is returned only when all three phases succeed.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stillwater::Validation;
use tracing::{debug, trace};

use crate::coerce;
use crate::error::{DefinitionError, FieldError, FieldErrors, RecordError};
use crate::path::FieldPath;
use crate::record::{FieldValue, Origin, Record};
use crate::validation::{CoercionMode, ValidationContext};

use super::rules::Rule;
use super::traits::{FieldValidator, SchemaLike};

type DeriveFn = Arc<dyn Fn(&Record) -> Option<Value> + Send + Sync>;

#[derive(Clone)]
enum Presence {
    Required,
    Optional,
    /// Validated when declared.
    Default(FieldValue),
}

#[derive(Clone)]
struct FieldDef {
    schema: Arc<dyn FieldValidator>,
    presence: Presence,
}

#[derive(Clone)]
struct DerivedDef {
    sources: Vec<String>,
    compute: DeriveFn,
}

/// What to do with input keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFields {
    /// Drop them silently.
    #[default]
    Ignore,
    /// Reject the input with an `unknown_field` violation.
    Forbid,
    /// Keep them on the record unvalidated, with [`Origin::Extra`].
    Keep,
}

/// Schema for a record: named, typed fields plus record rules and derived
/// fields.
///
/// Build the schema once and share it; validation never mutates it.
///
/// # Example
///
/// ```rust
/// use recordkit::{ErrorKind, Schema};
/// use serde_json::json;
///
/// let patient = Schema::record()
///     .field("age", Schema::integer().gt(0).lt(120))
///     .optional("contact", Schema::map(Schema::text()))
///     .rule("senior_contact", |r| {
///         if r.get_i64("age").unwrap_or(0) > 60 && !r.is_present("contact") {
///             Err("age over 60 requires contact".to_string())
///         } else {
///             Ok(())
///         }
///     });
///
/// let errors = patient.parse(&json!({"age": 65})).unwrap_err();
/// assert_eq!(errors.first().kind, ErrorKind::CrossFieldViolation);
///
/// let record = patient.parse(&json!({"age": 65, "contact": {"phone": "555-0100"}})).unwrap();
/// assert_eq!(record.get_i64("age"), Some(65));
/// ```
#[derive(Clone, Default)]
pub struct RecordSchema {
    name: Option<String>,
    fields: IndexMap<String, FieldDef>,
    derived: IndexMap<String, DerivedDef>,
    rules: Vec<Rule>,
    unknown_fields: UnknownFields,
    mode: Option<CoercionMode>,
    type_error_message: Option<String>,
}

impl RecordSchema {
    pub fn new() -> Self {
        <Self as Default>::default()
    }

    /// Names the schema in log output.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn declare<S>(mut self, name: impl Into<String>, schema: S, presence: Presence) -> Self
    where
        S: SchemaLike + 'static,
    {
        let name = name.into();
        // A declared field replaces a derived field of the same name.
        self.derived.shift_remove(&name);
        self.fields.insert(
            name,
            FieldDef {
                schema: Arc::new(schema),
                presence,
            },
        );
        self
    }

    /// A field that must be present and non-null.
    pub fn field<S>(self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.declare(name, schema, Presence::Required)
    }

    /// A field that may be absent or null.
    pub fn optional<S>(self, name: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.declare(name, schema, Presence::Optional)
    }

    /// A field that takes `default` when absent. Null is still rejected.
    ///
    /// The default is validated against `schema` here, so a default that
    /// could never pass is an error now rather than on every record.
    pub fn default<S>(self, name: impl Into<String>, schema: S, default: Value) -> Result<Self, DefinitionError>
    where
        S: SchemaLike + 'static,
    {
        let name = name.into();
        let path = FieldPath::from_field(&name);
        match SchemaLike::validate_field(&schema, &default, &path, &ValidationContext::default()) {
            Validation::Success(value) => Ok(self.declare(name, schema, Presence::Default(value))),
            Validation::Failure(errors) => Err(DefinitionError::InvalidDefault { field: name, errors }),
        }
    }

    pub fn unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Validate every field strictly unless the field schema says otherwise.
    pub fn strict(self) -> Self {
        self.mode(CoercionMode::Strict)
    }

    pub fn mode(mut self, mode: CoercionMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Message used when the input is not an object.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.type_error_message = Some(message.into());
        self
    }

    /// Adds a field computed from already-validated fields.
    ///
    /// `sources` must name declared fields or earlier derived fields. The
    /// field is left out of the record when any source is absent or null, or
    /// when `compute` returns `None`.
    ///
    /// ```rust
    /// use recordkit::Schema;
    /// use serde_json::json;
    ///
    /// let schema = Schema::record()
    ///     .field("weight", Schema::float().positive())
    ///     .field("height", Schema::float().positive())
    ///     .derived("bmi", ["weight", "height"], |r| {
    ///         let bmi = r.get_f64("weight")? / r.get_f64("height")?.powi(2);
    ///         Some(json!((bmi * 100.0).round() / 100.0))
    ///     })
    ///     .unwrap();
    ///
    /// let record = schema.parse(&json!({"weight": 70, "height": 1.75})).unwrap();
    /// assert_eq!(record.get_f64("bmi"), Some(22.86));
    /// ```
    pub fn derived<I, S, F>(mut self, name: impl Into<String>, sources: I, compute: F) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Record) -> Option<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.fields.contains_key(&name) || self.derived.contains_key(&name) {
            return Err(DefinitionError::NameCollision(name));
        }
        let sources: Vec<String> = sources.into_iter().map(Into::into).collect();
        if let Some(missing) = sources
            .iter()
            .find(|s| !self.fields.contains_key(*s) && !self.derived.contains_key(*s))
        {
            return Err(DefinitionError::UnknownSource {
                derived: name,
                source_field: missing.clone(),
            });
        }
        self.derived.insert(
            name,
            DerivedDef {
                sources,
                compute: Arc::new(compute),
            },
        );
        Ok(self)
    }

    /// Adds a named record rule. `check` returns the failure message.
    pub fn rule<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Record) -> Result<(), String> + Send + Sync + 'static,
    {
        self.rules.push(Rule::Custom {
            name: name.into(),
            check: Arc::new(check),
        });
        self
    }

    /// Adds a built-in rule once every field it names is declared.
    fn push_rule(mut self, rule: Rule) -> Result<Self, DefinitionError> {
        self.check_rule_fields(&rule)?;
        self.rules.push(rule);
        Ok(self)
    }

    fn check_rule_fields(&self, rule: &Rule) -> Result<(), DefinitionError> {
        match rule.fields().into_iter().find(|f| !self.fields.contains_key(*f)) {
            Some(field) => Err(DefinitionError::UnknownRuleField {
                rule: rule.name().to_string(),
                field: field.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// `required` must be present whenever `field` is present and satisfies
    /// `predicate`. Both fields must already be declared.
    pub fn require_if<P>(
        self,
        field: impl Into<String>,
        predicate: P,
        required: impl Into<String>,
    ) -> Result<Self, DefinitionError>
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.push_rule(Rule::RequireIf {
            field: field.into(),
            predicate: Arc::new(predicate),
            required: required.into(),
        })
    }

    pub fn mutually_exclusive(self, a: impl Into<String>, b: impl Into<String>) -> Result<Self, DefinitionError> {
        self.push_rule(Rule::MutuallyExclusive {
            a: a.into(),
            b: b.into(),
        })
    }

    pub fn at_least_one_of<I, S>(self, fields: I) -> Result<Self, DefinitionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push_rule(Rule::AtLeastOneOf {
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    /// Declared field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn derived_names(&self) -> impl Iterator<Item = &str> {
        self.derived.keys().map(String::as_str)
    }

    /// Re-checks the whole declaration, nested schemas included.
    ///
    /// The builders reject broken declarations as they are made; registration
    /// runs this once more over the finished schema.
    pub fn verify(&self) -> Result<(), DefinitionError> {
        for (name, def) in &self.fields {
            def.schema.verify().map_err(|source| DefinitionError::Nested {
                field: name.clone(),
                source: Box::new(source),
            })?;
        }
        self.rules.iter().try_for_each(|rule| self.check_rule_fields(rule))
    }

    /// Validates `value` from the root with the default lax context.
    pub fn validate(&self, value: &Value) -> Validation<Record, FieldErrors> {
        self.validate_with(value, &FieldPath::root(), &ValidationContext::default())
    }

    /// Like [`validate`](Self::validate), as a `Result`.
    pub fn parse(&self, value: &Value) -> Result<Record, FieldErrors> {
        self.validate(value).into_result()
    }

    /// Parses JSON text and validates it.
    pub fn validate_json(&self, text: &str) -> Result<Record, RecordError> {
        let value: Value = serde_json::from_str(text)?;
        Ok(self.parse(&value)?)
    }

    fn validate_fields(
        &self,
        obj: &serde_json::Map<String, Value>,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> (Record, Vec<FieldError>) {
        let mut record = Record::new();
        let mut errors = Vec::new();

        for (name, def) in &self.fields {
            let field_path = path.push_field(name);
            match (obj.get(name), &def.presence) {
                (Some(Value::Null), Presence::Optional) => {
                    record.insert(name, FieldValue::Plain(Value::Null), Origin::Supplied);
                }
                (Some(Value::Null), _) => errors.push(
                    FieldError::constraint(field_path, "not_null", format!("field '{}' may not be null", name))
                        .with_expected("value")
                        .with_got("null"),
                ),
                (Some(raw), _) => match def.schema.validate_field(raw, &field_path, ctx) {
                    Validation::Success(v) => record.insert(name, v, Origin::Supplied),
                    Validation::Failure(e) => errors.extend(e),
                },
                (None, Presence::Required) => errors.push(
                    FieldError::constraint(field_path, "required", format!("required field '{}' is missing", name))
                        .with_expected("value"),
                ),
                (None, Presence::Optional) => {}
                (None, Presence::Default(default)) => record.insert(name, default.clone(), Origin::Default),
            }
        }

        for (key, raw) in obj {
            if self.fields.contains_key(key) {
                continue;
            }
            let is_derived = self.derived.contains_key(key);
            match self.unknown_fields {
                UnknownFields::Forbid => {
                    let message = if is_derived {
                        format!("'{}' is computed and cannot be supplied", key)
                    } else {
                        format!("unknown field '{}'", key)
                    };
                    errors.push(FieldError::constraint(path.push_field(key), "unknown_field", message));
                }
                UnknownFields::Keep if !is_derived => {
                    record.insert(key.clone(), FieldValue::Plain(raw.clone()), Origin::Extra);
                }
                _ => trace!(%path, field = %key, "dropping undeclared input field"),
            }
        }

        (record, errors)
    }

    fn compute_derived(&self, record: &mut Record) {
        for (name, def) in &self.derived {
            if !def.sources.iter().all(|s| record.is_present(s)) {
                continue;
            }
            if let Some(value) = (def.compute)(record) {
                record.insert(name, FieldValue::Plain(value), Origin::Derived);
            }
        }
    }
}

impl SchemaLike for RecordSchema {
    type Output = Record;

    fn validate_with(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Record, FieldErrors> {
        if ctx.depth_exceeded() {
            return Validation::Failure(FieldErrors::single(FieldError::constraint(
                path.clone(),
                "max_depth_exceeded",
                format!("records nested deeper than {} levels", ctx.max_depth()),
            )));
        }

        let obj = match coerce::to_object(value, path, "record") {
            Ok(o) => o,
            Err(e) => {
                let e = match &self.type_error_message {
                    Some(m) => e.with_message(m.clone()),
                    None => e,
                };
                return Validation::Failure(FieldErrors::single(e));
            }
        };

        let inner = match self.mode {
            Some(mode) => ctx.descend().with_mode(mode),
            None => ctx.descend(),
        };
        let schema = self.name.as_deref().unwrap_or("record");

        let (mut record, errors) = self.validate_fields(obj, path, &inner);
        if let Some(errors) = FieldErrors::from_vec(errors) {
            debug!(schema, %path, errors = errors.len(), "field validation failed");
            return Validation::Failure(errors);
        }

        let violations: Vec<FieldError> = self
            .rules
            .iter()
            .filter_map(|rule| rule.check(&record, path))
            .collect();
        if let Some(errors) = FieldErrors::from_vec(violations) {
            debug!(schema, %path, errors = errors.len(), "record rules failed");
            return Validation::Failure(errors);
        }

        self.compute_derived(&mut record);
        trace!(schema, %path, fields = record.len(), "record validated");
        Validation::Success(record)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors> {
        SchemaLike::validate_with(self, value, path, ctx).map(|record| record.to_value())
    }

    fn validate_field(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<FieldValue, FieldErrors> {
        SchemaLike::validate_with(self, value, path, ctx).map(FieldValue::Nested)
    }

    fn verify(&self) -> Result<(), DefinitionError> {
        RecordSchema::verify(self)
    }
}
