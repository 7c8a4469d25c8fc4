//! Error types for mirror-store

use std::path::PathBuf;
use std::time::Duration;

use crate::ItemIdentifier;

/// Result type for mirror-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// No record exists for the identifier
    #[error("Item not found: {identifier}")]
    NotFound { identifier: ItemIdentifier },

    /// The cache could not answer within the allowed time
    #[error("Store unavailable after {waited:?}: {reason}")]
    Unavailable { waited: Duration, reason: String },

    /// Identifier failed validation
    #[error("Invalid identifier {value:?}: {reason}")]
    InvalidIdentifier { value: String, reason: String },

    /// A record with this identifier is already cached
    #[error("Duplicate identifier: {identifier}")]
    DuplicateIdentifier { identifier: ItemIdentifier },

    #[error("I/O error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to parse {format} snapshot at {path}: {message}")]
    SnapshotParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported snapshot format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn not_found(identifier: &ItemIdentifier) -> Self {
        Self::NotFound {
            identifier: identifier.clone(),
        }
    }

    pub fn unavailable(waited: Duration, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            waited,
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// True for failures of the cache itself rather than of the data in it
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Io { .. })
    }
}
