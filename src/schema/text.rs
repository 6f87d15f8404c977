//! Text field schema.
//!
//! [`TextSchema`] accepts JSON strings only and checks them against length,
//! pattern, format, domain and custom constraints. Transforms run after all
//! constraints have passed.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use stillwater::Validation;

use crate::coerce;
use crate::error::{DefinitionError, FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::validation::ValidationContext;

use super::traits::{finish, SchemaLike};

type TextCheck = Arc<dyn Fn(&str) -> Result<(), String> + Send + Sync>;
type TextTransform = Arc<dyn Fn(String) -> String + Send + Sync>;

#[derive(Clone)]
enum TextConstraint {
    MinLength {
        min: usize,
        message: Option<String>,
    },
    MaxLength {
        max: usize,
        message: Option<String>,
    },
    Pattern {
        regex: Regex,
        message: Option<String>,
    },
    Email {
        message: Option<String>,
    },
    Url {
        message: Option<String>,
    },
    OneOf {
        allowed: Vec<String>,
        message: Option<String>,
    },
    Custom {
        code: String,
        check: TextCheck,
        message: Option<String>,
    },
}

impl TextConstraint {
    fn message_slot(&mut self) -> &mut Option<String> {
        match self {
            TextConstraint::MinLength { message, .. }
            | TextConstraint::MaxLength { message, .. }
            | TextConstraint::Pattern { message, .. }
            | TextConstraint::Email { message }
            | TextConstraint::Url { message }
            | TextConstraint::OneOf { message, .. }
            | TextConstraint::Custom { message, .. } => message,
        }
    }
}

/// Schema for text fields.
///
/// # Example
///
/// ```rust
/// use recordkit::Schema;
/// use serde_json::json;
///
/// let name = Schema::text().min_len(1).max_len(50).to_uppercase();
///
/// let result = name.validate(&json!("asha rao"));
/// assert_eq!(result.into_result().unwrap(), "ASHA RAO");
///
/// assert!(name.validate(&json!("")).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct TextSchema {
    constraints: Vec<TextConstraint>,
    transforms: Vec<TextTransform>,
    type_error_message: Option<String>,
}

impl TextSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// At least `min` characters (Unicode scalar values, not bytes).
    pub fn min_len(mut self, min: usize) -> Self {
        self.constraints
            .push(TextConstraint::MinLength { min, message: None });
        self
    }

    pub fn max_len(mut self, max: usize) -> Self {
        self.constraints
            .push(TextConstraint::MaxLength { max, message: None });
        self
    }

    /// Must match `pattern`. Fails at definition time if the regex is invalid.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, DefinitionError> {
        let regex = Regex::new(pattern).map_err(|source| DefinitionError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.constraints.push(TextConstraint::Pattern {
            regex,
            message: None,
        });
        Ok(self)
    }

    /// Must look like an email address: `local@domain.tld`, no whitespace.
    pub fn email(mut self) -> Self {
        self.constraints.push(TextConstraint::Email { message: None });
        self
    }

    /// Must be an absolute `http` or `https` URL with a host.
    pub fn url(mut self) -> Self {
        self.constraints.push(TextConstraint::Url { message: None });
        self
    }

    /// Must equal one of `allowed`.
    pub fn one_of<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.push(TextConstraint::OneOf {
            allowed: allowed.into_iter().map(Into::into).collect(),
            message: None,
        });
        self
    }

    /// Adds a caller-supplied check. `check` returns the failure message.
    ///
    /// ```rust
    /// use recordkit::Schema;
    /// use serde_json::json;
    ///
    /// let corporate = Schema::text().email().custom("email_domain", |s| {
    ///     if s.ends_with("@hdfc.com") || s.ends_with("@icici.com") {
    ///         Ok(())
    ///     } else {
    ///         Err("not a partner domain".to_string())
    ///     }
    /// });
    ///
    /// let errors = corporate.validate(&json!("a@gmail.com")).into_result().unwrap_err();
    /// assert_eq!(errors.first().code, "email_domain");
    /// ```
    pub fn custom<F>(mut self, code: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str) -> Result<(), String> + Send + Sync + 'static,
    {
        self.constraints.push(TextConstraint::Custom {
            code: code.into(),
            check: Arc::new(check),
            message: None,
        });
        self
    }

    /// Rewrites the value once every constraint has passed.
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> String + Send + Sync + 'static,
    {
        self.transforms.push(Arc::new(f));
        self
    }

    pub fn to_uppercase(self) -> Self {
        self.transform(|s| s.to_uppercase())
    }

    pub fn trim(self) -> Self {
        self.transform(|s| s.trim().to_string())
    }

    /// Overrides the message of the most recent constraint, or of the type
    /// error if no constraint has been added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        match self.constraints.last_mut() {
            Some(last) => *last.message_slot() = Some(message.into()),
            None => self.type_error_message = Some(message.into()),
        }
        self
    }

    pub fn validate(&self, value: &Value) -> Validation<String, FieldErrors> {
        self.validate_with(value, &FieldPath::root(), &ValidationContext::default())
    }
}

impl SchemaLike for TextSchema {
    type Output = String;

    fn validate_with(
        &self,
        value: &Value,
        path: &FieldPath,
        _ctx: &ValidationContext,
    ) -> Validation<String, FieldErrors> {
        let s = match coerce::to_text(value, path) {
            Ok(s) => s,
            Err(e) => {
                let e = match &self.type_error_message {
                    Some(m) => e.with_message(m.clone()),
                    None => e,
                };
                return Validation::Failure(FieldErrors::single(e));
            }
        };

        let errors: Vec<FieldError> = self
            .constraints
            .iter()
            .filter_map(|c| check_constraint(c, s, path))
            .collect();
        if !errors.is_empty() {
            return finish(String::new(), errors);
        }

        let out = self
            .transforms
            .iter()
            .fold(s.to_string(), |acc, transform| transform(acc));
        Validation::Success(out)
    }

    fn validate_to_value(
        &self,
        value: &Value,
        path: &FieldPath,
        ctx: &ValidationContext,
    ) -> Validation<Value, FieldErrors> {
        self.validate_with(value, path, ctx).map(Value::String)
    }
}

fn check_constraint(constraint: &TextConstraint, value: &str, path: &FieldPath) -> Option<FieldError> {
    let violation = |code: &str, default_message: String, message: &Option<String>| {
        FieldError::constraint(
            path.clone(),
            code,
            message.clone().unwrap_or(default_message),
        )
    };

    match constraint {
        TextConstraint::MinLength { min, message } => {
            let len = value.chars().count();
            (len < *min).then(|| {
                violation("min_length", format!("length must be at least {}, got {}", min, len), message)
                    .with_expected(format!("at least {} characters", min))
                    .with_got(format!("{} characters", len))
            })
        }
        TextConstraint::MaxLength { max, message } => {
            let len = value.chars().count();
            (len > *max).then(|| {
                violation("max_length", format!("length must be at most {}, got {}", max, len), message)
                    .with_expected(format!("at most {} characters", max))
                    .with_got(format!("{} characters", len))
            })
        }
        TextConstraint::Pattern { regex, message } => (!regex.is_match(value)).then(|| {
            violation("pattern", format!("must match pattern '{}'", regex.as_str()), message)
                .with_expected(format!("text matching '{}'", regex.as_str()))
                .with_got(value.to_string())
        }),
        TextConstraint::Email { message } => (!is_email(value)).then(|| {
            violation("email", "must be a valid email address".to_string(), message)
                .with_expected("email address")
                .with_got(value.to_string())
        }),
        TextConstraint::Url { message } => (!is_url(value)).then(|| {
            violation("url", "must be a valid http(s) URL".to_string(), message)
                .with_expected("http(s) URL")
                .with_got(value.to_string())
        }),
        TextConstraint::OneOf { allowed, message } => (!allowed.iter().any(|a| a == value)).then(|| {
            violation("one_of", format!("must be one of {:?}", allowed), message)
                .with_expected(allowed.join(", "))
                .with_got(value.to_string())
        }),
        TextConstraint::Custom {
            code,
            check,
            message,
        } => check(value).err().map(|reason| {
            violation(code.as_str(), reason, message).with_got(value.to_string())
        }),
    }
}

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)*\.[^\s@.]{2,}$").expect("email pattern compiles")
});

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/?#]+([/?#]\S*)?$").expect("url pattern compiles"));

fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

fn is_url(value: &str) -> bool {
    URL.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn unwrap_failure<T: std::fmt::Debug>(v: Validation<T, FieldErrors>) -> FieldErrors {
        v.into_result().unwrap_err()
    }

    #[test]
    fn test_accepts_string() {
        let result = TextSchema::new().validate(&json!("hello"));
        assert_eq!(result.into_result().unwrap(), "hello");
    }

    #[test]
    fn test_rejects_number_even_in_lax_mode() {
        let errors = unwrap_failure(TextSchema::new().validate(&json!(42)));
        assert_eq!(errors.first().kind, ErrorKind::TypeMismatch);
        assert_eq!(errors.first().got.as_deref(), Some("42"));
    }

    #[test]
    fn test_length_counts_characters() {
        let schema = TextSchema::new().min_len(3).max_len(5);
        assert!(schema.validate(&json!("日本語")).is_success());
        let errors = unwrap_failure(schema.validate(&json!("🎉🎊")));
        assert_eq!(errors.first().code, "min_length");
        assert_eq!(errors.first().kind, ErrorKind::ConstraintViolation);
    }

    #[test]
    fn test_collects_every_violation() {
        let schema = TextSchema::new().min_len(10).pattern(r"^\d+$").unwrap();
        let errors = unwrap_failure(schema.validate(&json!("abc")));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.with_code("pattern").len(), 1);
    }

    #[test]
    fn test_invalid_pattern_is_definition_error() {
        let err = TextSchema::new().pattern("[unclosed").err().unwrap();
        assert!(matches!(err, DefinitionError::InvalidPattern { .. }));
    }

    #[test]
    fn test_email_format() {
        let schema = TextSchema::new().email();
        for ok in ["a@b.co", "first.last@hdfc.com"] {
            assert!(schema.validate(&json!(ok)).is_success(), "{}", ok);
        }
        for bad in ["plain", "@b.com", "a@b", "a@@b.com", "a b@c.com", "a@.com", "a@b..com", "a@b.c"] {
            assert!(schema.validate(&json!(bad)).is_failure(), "{}", bad);
        }
    }

    #[test]
    fn test_url_format() {
        let schema = TextSchema::new().url();
        assert!(schema.validate(&json!("https://linkedin.com/in/asha")).is_success());
        assert!(schema.validate(&json!("http://example.org")).is_success());
        assert!(schema.validate(&json!("ftp://example.org")).is_failure());
        assert!(schema.validate(&json!("https://")).is_failure());
        assert!(schema.validate(&json!("https://example.org/a b")).is_failure());
        assert!(schema.validate(&json!("https://example.org?q=1#top")).is_success());
    }

    #[test]
    fn test_one_of() {
        let schema = TextSchema::new().one_of(["hardcover", "paperback"]);
        assert!(schema.validate(&json!("paperback")).is_success());
        let errors = unwrap_failure(schema.validate(&json!("scroll")));
        assert_eq!(errors.first().code, "one_of");
        assert_eq!(errors.first().expected.as_deref(), Some("hardcover, paperback"));
    }

    #[test]
    fn test_transforms_run_after_constraints() {
        let schema = TextSchema::new().max_len(3).trim().to_uppercase();
        assert!(schema.validate(&json!(" ab ")).is_failure());
        assert_eq!(schema.validate(&json!("ab")).into_result().unwrap(), "AB");
    }

    #[test]
    fn test_custom_message_overrides_last_constraint() {
        let schema = TextSchema::new().min_len(5).error("name too short");
        let errors = unwrap_failure(schema.validate(&json!("ab")));
        assert_eq!(errors.first().message, "name too short");

        let schema = TextSchema::new().error("must be text");
        let errors = unwrap_failure(schema.validate(&json!(1)));
        assert_eq!(errors.first().message, "must be text");
    }

    #[test]
    fn test_path_is_reported() {
        let path = FieldPath::from_field("address").push_field("city");
        let result = TextSchema::new()
            .min_len(1)
            .validate_with(&json!(""), &path, &ValidationContext::default());
        assert_eq!(unwrap_failure(result).first().path.to_string(), "address.city");
    }
}
