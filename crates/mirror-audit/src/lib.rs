//! Consistency validation for the item metadata mirror
//!
//! Given a root identifier, a session walks the subtree the mirror lists
//! below it, runs a set of independent invariant checkers over what it saw
//! and aggregates their findings into a [`ValidationReport`]. The engine is
//! strictly read-only: nothing in this crate mutates the store.
//!
//! - [`walker`]: bounded depth-first traversal with cycle detection
//! - [`checkers`]: identity, hierarchy, working-set, dangling-reference and
//!   path rules
//! - [`report`]: deterministic aggregation and rendering
//! - [`session`]: the session state machine and the [`Validator`] entry point
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use mirror_audit::{AuditConfig, Validator};
//! use mirror_store::{ItemKind, ItemRecord, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.insert(ItemRecord::new("root", None, "/", ItemKind::Folder)).unwrap();
//! store.insert(ItemRecord::new("a", Some("root"), "a.txt", ItemKind::File)).unwrap();
//!
//! let validator = Validator::new(Arc::new(store), AuditConfig::default());
//! let report = validator.validate(&"root".into(), Duration::from_secs(1)).unwrap();
//! assert!(report.is_clean());
//! ```

pub mod checkers;
pub mod config;
pub mod deadline;
pub mod error;
pub mod finding;
pub mod report;
pub mod session;
pub mod walker;

pub use checkers::{CheckContext, CheckError, Checker, CheckerKind, checker_for, enabled_checkers};
pub use config::AuditConfig;
pub use deadline::Deadline;
pub use error::{Error, Result};
pub use finding::{Finding, Rule, Severity};
pub use report::{ReportBuilder, ReportSummary, SessionNote, SessionStamp, ValidationReport};
pub use session::{FailureReason, SessionFailure, SessionState, ValidationSession, Validator};
pub use walker::{GraphWalker, VisitedNode, WalkError, WalkEvent};
