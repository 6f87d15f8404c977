//! Locations of values inside nested record input.
//!
//! A [`FieldPath`] is built up while a record schema walks its input, so every
//! error can say exactly where it happened (`address.pin`, `allergies[1]`).

use std::fmt::{self, Display};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field or mapping key, e.g. `contact`.
    Field(String),
    /// A position inside a list, e.g. `[3]`.
    Index(usize),
}

impl PathSegment {
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// Path from the record root to a nested value.
///
/// Paths are immutable; `push_*` returns an extended copy so sibling fields
/// can share a common prefix.
///
/// # Example
///
/// ```rust
/// use recordkit::FieldPath;
///
/// let path = FieldPath::root().push_field("allergies").push_index(1);
/// assert_eq!(path.to_string(), "allergies[1]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path, pointing at the record itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// A single-segment path naming a top-level field.
    pub fn from_field(name: impl Into<String>) -> Self {
        Self {
            segments: vec![PathSegment::Field(name.into())],
        }
    }

    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments (nesting depth of the addressed value).
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// The path without its last segment, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            segments: rest.to_vec(),
        })
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Returns true if `self` is `other` or lies underneath it.
    pub fn starts_with(&self, other: &FieldPath) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// Name of the top-level field this path goes through, if any.
    pub fn top_field(&self) -> Option<&str> {
        match self.segments.first() {
            Some(PathSegment::Field(name)) => Some(name),
            _ => None,
        }
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_displays_empty() {
        let path = FieldPath::root();
        assert!(path.is_root());
        assert_eq!(path.len(), 0);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_nested_field_and_index() {
        let path = FieldPath::root()
            .push_field("address")
            .push_field("lines")
            .push_index(0);
        assert_eq!(path.to_string(), "address.lines[0]");
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_leading_index() {
        let path = FieldPath::root().push_index(4).push_field("title");
        assert_eq!(path.to_string(), "[4].title");
    }

    #[test]
    fn test_push_leaves_original_untouched() {
        let base = FieldPath::from_field("contact");
        let phone = base.push_field("phone");
        let email = base.push_field("email");

        assert_eq!(base.to_string(), "contact");
        assert_eq!(phone.to_string(), "contact.phone");
        assert_eq!(email.to_string(), "contact.email");
    }

    #[test]
    fn test_parent_walks_to_root() {
        let path = FieldPath::root().push_field("a").push_index(2);
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "a");
        assert!(parent.parent().unwrap().is_root());
        assert!(FieldPath::root().parent().is_none());
    }

    #[test]
    fn test_starts_with_and_top_field() {
        let path = FieldPath::root().push_field("address").push_field("pin");
        assert!(path.starts_with(&FieldPath::from_field("address")));
        assert!(!path.starts_with(&FieldPath::from_field("contact")));
        assert_eq!(path.top_field(), Some("address"));
        assert_eq!(FieldPath::root().push_index(0).top_field(), None);
    }

    #[test]
    fn test_last_segment() {
        let path = FieldPath::root().push_field("tags").push_index(1);
        assert_eq!(path.last(), Some(&PathSegment::Index(1)));
        assert_eq!(FieldPath::root().last(), None);
    }
}
