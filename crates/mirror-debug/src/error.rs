//! Error types for mirror-debug

use thiserror::Error;

/// Result type alias for debug service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while setting up or serving validation requests
///
/// A failed validation session is not an error here: it travels as a
/// [`SessionFailure`](mirror_audit::SessionFailure) to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the metadata mirror
    #[error(transparent)]
    Store(#[from] mirror_store::Error),

    /// Error from the validation engine (configuration, serialization)
    #[error(transparent)]
    Audit(#[from] mirror_audit::Error),

    /// No service is registered for the identifier's domain
    #[error("no validation service for domain {domain:?}")]
    DomainNotFound { domain: String },

    /// A `--domain` argument that is not `name=snapshot`
    #[error("invalid domain spec {spec:?}: expected <name>=<snapshot>")]
    InvalidDomainSpec { spec: String },

    /// The same domain was registered twice
    #[error("domain {domain:?} registered twice")]
    DuplicateDomain { domain: String },

    /// A blocking validation task panicked or was cancelled
    #[error("validation task failed: {0}")]
    Task(String),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
