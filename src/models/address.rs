use std::fmt;

use crate::error::ValidationError;

/// Account identifier, lowercased on construction.
///
/// Every lookup and comparison goes through this type so that storage and
/// filtering agree on case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(String);

impl Address {
    pub fn new(raw: &str) -> Self {
        Self(raw.to_lowercase())
    }

    /// Boundary constructor: rejects the empty string, nothing else.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::EmptyAddress);
        }
        Ok(Self::new(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw upstream field
    pub fn matches(&self, other: &str) -> bool {
        other.to_lowercase() == self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}
