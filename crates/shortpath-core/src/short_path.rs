use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Maximum length of a caller-supplied short path.
pub const MAX_LENGTH: usize = 50;

/// Literals that can never be allocated because they collide with routes of
/// the HTTP layer.
pub const RESERVED: &[&str] = &["metrics"];

/// A short path identifier that resolves back to a target URL.
///
/// Short paths contain only ASCII alphanumeric characters, hyphens, or
/// underscores and are at most [`MAX_LENGTH`] characters long.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortPath(String);

/// Returns `true` if `c` may appear in a short path.
pub fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl ShortPath {
    /// Creates a new `ShortPath` after validating the input.
    ///
    /// Checks run in a fixed order so the first failing rule decides the
    /// error: padding, alphabet, reserved literals, length.
    pub fn parse(path: impl Into<String>) -> Result<Self, ValidationError> {
        let path = path.into();
        Self::validate(&path)?;
        Ok(Self(path))
    }

    /// Creates a `ShortPath` without validation.
    ///
    /// Use this only for values produced by trusted internal sources, such as
    /// a generator drawing from a validated alphabet or a value read back from
    /// the reverse store.
    pub fn new_unchecked(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Returns the short path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if this path equals one of the [`RESERVED`] literals.
    pub fn is_reserved(&self) -> bool {
        RESERVED.contains(&self.0.as_str())
    }

    /// Generates the full short URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    fn validate(path: &str) -> Result<(), ValidationError> {
        if path.is_empty() {
            return Err(ValidationError::ShortPathEmpty);
        }
        if path.trim() != path {
            return Err(ValidationError::ShortPathPadded);
        }
        if !path.chars().all(is_allowed_char) {
            return Err(ValidationError::ShortPathDisallowedChars);
        }
        if RESERVED.contains(&path) {
            return Err(ValidationError::ShortPathReserved);
        }
        if path.len() > MAX_LENGTH {
            return Err(ValidationError::ShortPathTooLong);
        }
        Ok(())
    }
}

impl Display for ShortPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
