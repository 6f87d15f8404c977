//! Record-level rules spanning several fields.
//!
//! Rules run against a record whose fields have all passed validation and
//! report [`ErrorKind::CrossFieldViolation`](crate::ErrorKind::CrossFieldViolation).

use std::sync::Arc;

use serde_json::Value;

use crate::error::FieldError;
use crate::path::FieldPath;
use crate::record::Record;

pub(crate) type RuleFn = Arc<dyn Fn(&Record) -> Result<(), String> + Send + Sync>;
pub(crate) type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

#[derive(Clone)]
pub(crate) enum Rule {
    Custom {
        name: String,
        check: RuleFn,
    },
    RequireIf {
        field: String,
        predicate: Predicate,
        required: String,
    },
    MutuallyExclusive {
        a: String,
        b: String,
    },
    AtLeastOneOf {
        fields: Vec<String>,
    },
}

impl Rule {
    pub(crate) fn name(&self) -> &str {
        match self {
            Rule::Custom { name, .. } => name.as_str(),
            Rule::RequireIf { .. } => "conditional_required",
            Rule::MutuallyExclusive { .. } => "mutually_exclusive",
            Rule::AtLeastOneOf { .. } => "at_least_one_required",
        }
    }

    /// Fields the rule names explicitly. Custom rules name none.
    pub(crate) fn fields(&self) -> Vec<&str> {
        match self {
            Rule::Custom { .. } => Vec::new(),
            Rule::RequireIf { field, required, .. } => vec![field.as_str(), required.as_str()],
            Rule::MutuallyExclusive { a, b } => vec![a.as_str(), b.as_str()],
            Rule::AtLeastOneOf { fields } => fields.iter().map(String::as_str).collect(),
        }
    }

    pub(crate) fn check(&self, record: &Record, path: &FieldPath) -> Option<FieldError> {
        match self {
            Rule::Custom { name, check } => check(record)
                .err()
                .map(|message| FieldError::cross_field(path.clone(), name.clone(), message)),
            Rule::RequireIf {
                field,
                predicate,
                required,
            } => {
                let triggered = record
                    .get(field)
                    .is_some_and(|v| !v.is_null() && predicate(v));
                (triggered && !record.is_present(required)).then(|| {
                    FieldError::cross_field(
                        path.push_field(required),
                        self.name(),
                        format!("'{}' is required when '{}' is {}", required, field, render(record.get(field))),
                    )
                    .with_expected("value")
                })
            }
            Rule::MutuallyExclusive { a, b } => (record.is_present(a) && record.is_present(b)).then(|| {
                FieldError::cross_field(
                    path.clone(),
                    self.name(),
                    format!("'{}' and '{}' cannot both be set", a, b),
                )
            }),
            Rule::AtLeastOneOf { fields } => (!fields.iter().any(|f| record.is_present(f))).then(|| {
                FieldError::cross_field(
                    path.clone(),
                    self.name(),
                    format!("at least one of {} must be set", fields.join(", ")),
                )
                .with_expected(fields.join(" or "))
            }),
        }
    }
}

fn render(value: Option<&Value>) -> String {
    value.map_or_else(|| "absent".to_string(), crate::coerce::render)
}
