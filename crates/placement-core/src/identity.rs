//! # Organization Identifier
//!
//! Organizations are created by the registration flow outside this engine,
//! so the identifier is opaque: whatever the backend hands out (numeric
//! strings, UUIDs, slugs). It is validated only for being non-empty and
//! free of surrounding whitespace.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum accepted identifier length in bytes.
const MAX_ID_LEN: usize = 128;

/// Stable identifier of an organization for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrganizationId(String);

impl OrganizationId {
    /// Validate and wrap an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] when the input is empty,
    /// longer than 128 bytes, or has leading/trailing whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidIdentifier {
                input: id,
                reason: "identifier must not be empty",
            });
        }
        if id.len() > MAX_ID_LEN {
            return Err(CoreError::InvalidIdentifier {
                input: id,
                reason: "identifier exceeds 128 bytes",
            });
        }
        if id.trim() != id {
            return Err(CoreError::InvalidIdentifier {
                input: id,
                reason: "identifier has surrounding whitespace",
            });
        }
        Ok(Self(id))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrganizationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl TryFrom<String> for OrganizationId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for OrganizationId {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrganizationId> for String {
    fn from(id: OrganizationId) -> Self {
        id.0
    }
}

impl std::str::FromStr for OrganizationId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
