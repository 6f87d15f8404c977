//! Coercion policy and per-call validation state.

use serde::{Deserialize, Serialize};

/// Default limit on how deeply records may nest inside one another.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// How willing a schema is to convert raw values to its declared type.
///
/// `Lax` accepts well-formed conversions such as `"30"` for an integer or
/// `"yes"` for a boolean. `Strict` accepts only values that already have the
/// declared JSON type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionMode {
    #[default]
    Lax,
    Strict,
}

/// State threaded through one validation call.
///
/// Contexts are cheap values; entering a nested record produces a new one
/// with the depth incremented, so sibling fields never see each other's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    mode: CoercionMode,
    depth: usize,
    max_depth: usize,
}

impl ValidationContext {
    pub fn new(mode: CoercionMode) -> Self {
        Self {
            mode,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Same context with a different coercion mode.
    pub fn with_mode(mut self, mode: CoercionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Context for the fields of a nested record.
    pub fn descend(&self) -> Self {
        Self {
            depth: self.depth + 1,
            ..*self
        }
    }

    pub fn mode(&self) -> CoercionMode {
        self.mode
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns true once `depth` has reached the configured limit.
    pub fn depth_exceeded(&self) -> bool {
        self.depth >= self.max_depth
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new(CoercionMode::default())
    }
}
