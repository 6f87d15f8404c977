//! Validation error values.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use crate::path::FieldPath;

/// Which stage of validation rejected the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The raw value could not be coerced to the declared type.
    TypeMismatch,
    /// A coerced value broke a field-level rule (range, length, pattern,
    /// required, not-null, ...).
    ConstraintViolation,
    /// The record as a whole broke a rule spanning several fields.
    CrossFieldViolation,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::TypeMismatch => "type mismatch",
            ErrorKind::ConstraintViolation => "constraint violation",
            ErrorKind::CrossFieldViolation => "cross-field violation",
        };
        f.write_str(name)
    }
}

/// A single validation failure.
///
/// Carries everything needed to show the problem to an end user: where it
/// happened, what went wrong, what was expected and what was received.
///
/// # Example
///
/// ```rust
/// use recordkit::{ErrorKind, FieldError, FieldPath};
///
/// let error = FieldError::constraint(FieldPath::from_field("age"), "max_value", "must be at most 119")
///     .with_expected("at most 119")
///     .with_got("140");
///
/// assert_eq!(error.kind, ErrorKind::ConstraintViolation);
/// assert_eq!(error.to_string(), "age: must be at most 119 (expected: at most 119) (got: 140)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub kind: ErrorKind,
    /// Location of the offending value.
    pub path: FieldPath,
    /// Human-readable description.
    pub message: String,
    /// The received value, rendered as text.
    pub got: Option<String>,
    /// Description of what would have been accepted.
    pub expected: Option<String>,
    /// Machine-readable code, e.g. `min_length` or `required`.
    pub code: String,
    /// Name of the record-level rule, for cross-field violations.
    pub rule: Option<String>,
}

impl FieldError {
    pub fn new(kind: ErrorKind, path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
            got: None,
            expected: None,
            code: "validation_error".to_string(),
            rule: None,
        }
    }

    /// A value of the wrong type. `expected` names the declared type.
    pub fn type_mismatch(path: FieldPath, message: impl Into<String>, expected: &str) -> Self {
        Self::new(ErrorKind::TypeMismatch, path, message)
            .with_code("invalid_type")
            .with_expected(expected)
    }

    pub fn constraint(path: FieldPath, code: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConstraintViolation, path, message).with_code(code)
    }

    pub fn cross_field(path: FieldPath, rule: impl Into<String>, message: impl Into<String>) -> Self {
        let rule = rule.into();
        Self {
            rule: Some(rule.clone()),
            ..Self::new(ErrorKind::CrossFieldViolation, path, message).with_code(rule)
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_got(mut self, got: impl Into<String>) -> Self {
        self.got = Some(got.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(record): {}", self.message)?;
        } else {
            write!(f, "{}: {}", self.path, self.message)?;
        }
        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if let Some(ref got) = self.got {
            write!(f, " (got: {})", got)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// Every failure found while validating one input. Never empty.
///
/// `FieldErrors` is a [`Semigroup`], so results from independent checks can
/// be merged without losing anything:
///
/// ```rust
/// use recordkit::{FieldError, FieldErrors, FieldPath};
/// use stillwater::prelude::*;
///
/// let a = FieldErrors::single(FieldError::constraint(FieldPath::from_field("name"), "required", "missing"));
/// let b = FieldErrors::single(FieldError::constraint(FieldPath::from_field("age"), "required", "missing"));
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors(NonEmptyVec<FieldError>);

impl FieldErrors {
    pub fn single(error: FieldError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Builds a collection from a vec, or `None` if the vec is empty.
    pub fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        let mut iter = errors.into_iter();
        let head = iter.next()?;
        Some(iter.fold(Self::single(head), |acc, e| acc.combine(Self::single(e))))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn first(&self) -> &FieldError {
        self.0.head()
    }

    pub fn at_path(&self, path: &FieldPath) -> Vec<&FieldError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Errors located at or below the top-level field `name`.
    pub fn for_field(&self, name: &str) -> Vec<&FieldError> {
        self.0
            .iter()
            .filter(|e| e.path.top_field() == Some(name))
            .collect()
    }

    pub fn with_code(&self, code: &str) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    pub fn of_kind(&self, kind: ErrorKind) -> Vec<&FieldError> {
        self.0.iter().filter(|e| e.kind == kind).collect()
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0.into_vec()
    }
}

impl Semigroup for FieldErrors {
    fn combine(self, other: Self) -> Self {
        FieldErrors(self.0.combine(other.0))
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. [{}] {}", i + 1, error.kind, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FieldError>();
    assert_send_sync::<FieldErrors>();
};
