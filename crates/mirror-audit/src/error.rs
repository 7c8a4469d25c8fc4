//! Error types for mirror-audit

use std::path::PathBuf;

/// Result type for mirror-audit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside of a validation session
///
/// Failures of a running session are reported as
/// [`SessionFailure`](crate::SessionFailure), not through this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parsed but holds unusable values
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Transparent wrappers for underlying crate errors
    /// Store error from mirror-store
    #[error(transparent)]
    Store(#[from] mirror_store::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}
