//! Item identifiers

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Separator between the domain prefix and the local part of an identifier.
pub const DOMAIN_DELIMITER: char = ':';

/// Opaque, stable identifier of one node in the item graph.
///
/// Equality is exact string match. Identifiers created by a domain-scoped
/// provider have the form `<domain>:<local-id>`; the domain can be recovered
/// with [`ItemIdentifier::domain`]. Identifiers without a delimiter (such as
/// the root container) belong to no domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemIdentifier(String);

impl ItemIdentifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a domain-scoped identifier `<domain>:<local>`.
    pub fn with_domain(domain: &str, local: &str) -> Self {
        Self(format!("{domain}{DOMAIN_DELIMITER}{local}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The domain prefix, if the identifier carries one.
    pub fn domain(&self) -> Option<&str> {
        self.0
            .split_once(DOMAIN_DELIMITER)
            .map(|(domain, _)| domain)
            .filter(|domain| !domain.is_empty())
    }

    /// The part after the domain prefix, or the whole identifier.
    pub fn local_part(&self) -> &str {
        match self.0.split_once(DOMAIN_DELIMITER) {
            Some((_, local)) => local,
            None => &self.0,
        }
    }
}

impl fmt::Display for ItemIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemIdentifier {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemIdentifier {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for ItemIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate that a raw identifier is usable as a store key.
///
/// Rejects empty identifiers, surrounding whitespace and control characters.
pub fn validate_identifier(value: &str) -> Result<()> {
    let reason = if value.is_empty() {
        Some("identifier is empty")
    } else if value.trim() != value {
        Some("identifier has leading or trailing whitespace")
    } else if value.chars().any(char::is_control) {
        Some("identifier contains control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidIdentifier {
            value: value.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
