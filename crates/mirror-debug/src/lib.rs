//! Debug-build validation service
//!
//! Exposes the mirror validation engine to developer tooling while the
//! sync extension is being debugged:
//!
//! ```text
//! [ debugging client ]
//!        | (JSON-RPC over stdio)
//!        v
//! [ DebugServer ] --> [ ServiceRouter ] --(domain key)--> [ ValidationService ]
//!                                                              |
//!                                                              v
//!                                                   [ mirror_audit::Validator ]
//! ```
//!
//! The service modules exist only in debug builds, or in release builds
//! with the `debug-service` feature. Report rendering and setup helpers are
//! always available.

pub mod error;
pub mod render;
pub mod setup;

#[cfg(any(debug_assertions, feature = "debug-service"))]
pub mod protocol;
#[cfg(any(debug_assertions, feature = "debug-service"))]
pub mod router;
#[cfg(any(debug_assertions, feature = "debug-service"))]
pub mod server;
#[cfg(any(debug_assertions, feature = "debug-service"))]
pub mod service;

pub use error::{Error, Result};
pub use setup::{DomainSpec, load_config, load_validator};

#[cfg(any(debug_assertions, feature = "debug-service"))]
pub use router::ServiceRouter;
#[cfg(any(debug_assertions, feature = "debug-service"))]
pub use server::DebugServer;
#[cfg(any(debug_assertions, feature = "debug-service"))]
pub use service::ValidationService;
