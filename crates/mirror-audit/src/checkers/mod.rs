//! Invariant checkers
//!
//! Each checker is an independent rule evaluator over the complete walk of
//! one session. Checkers do not depend on each other's output; within one
//! checker findings are produced in traversal order.
//!
//! - **identity**: declared parent matches the discovering item
//! - **hierarchy**: cycles, sibling name collisions, children of non-folders
//! - **working_set**: stale placeholders and failed uploads of resident items
//! - **dangling**: unresolved listed children and declared parents
//! - **path**: remote paths consistent with the hierarchy
//!
//! A checker reports store infrastructure failures through
//! [`CheckError::Store`]; the session turns those into a session failure.
//! Any other [`CheckError`] only skips that checker.

mod dangling;
mod hierarchy;
mod identity;
mod path;
mod working_set;

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use mirror_store::{ItemIdentifier, ItemStore};
use serde::{Deserialize, Serialize};

use crate::config::AuditConfig;
use crate::deadline::Deadline;
use crate::finding::Finding;
use crate::walker::VisitedNode;

pub use dangling::DanglingReferenceChecker;
pub use hierarchy::HierarchyChecker;
pub use identity::IdentityChecker;
pub use path::PathChecker;
pub use working_set::WorkingSetChecker;

/// Names of the built-in checkers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckerKind {
    Identity,
    Hierarchy,
    WorkingSet,
    Dangling,
    Path,
}

impl CheckerKind {
    pub const ALL: [CheckerKind; 5] = [
        Self::Identity,
        Self::Hierarchy,
        Self::WorkingSet,
        Self::Dangling,
        Self::Path,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Hierarchy => "hierarchy",
            Self::WorkingSet => "working_set",
            Self::Dangling => "dangling",
            Self::Path => "path",
        }
    }
}

impl std::fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown checker: {s}"))
    }
}

/// Why a checker could not produce its findings
#[derive(Debug, Clone, thiserror::Error)]
pub enum CheckError {
    /// The store could not answer a lookup
    #[error(transparent)]
    Store(#[from] mirror_store::Error),

    /// The checker hit a condition it cannot evaluate
    #[error("{message}")]
    Internal { message: String },
}

impl CheckError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True when the failure lies in the store rather than the checker
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_infrastructure())
    }
}

/// Everything a checker may look at
pub struct CheckContext<'a> {
    pub root: &'a ItemIdentifier,
    /// Visited nodes in traversal order
    pub nodes: &'a [VisitedNode],
    /// Cycle and dangling-reference signals raised by the walker
    pub walk_findings: &'a [Finding],
    pub store: &'a dyn ItemStore,
    pub config: &'a AuditConfig,
    pub deadline: Deadline,
    /// Reference time for age-based rules
    pub now: DateTime<Utc>,
    index: HashMap<&'a ItemIdentifier, usize>,
}

impl<'a> CheckContext<'a> {
    pub fn new(
        root: &'a ItemIdentifier,
        nodes: &'a [VisitedNode],
        walk_findings: &'a [Finding],
        store: &'a dyn ItemStore,
        config: &'a AuditConfig,
        deadline: Deadline,
        now: DateTime<Utc>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.identifier(), position))
            .collect();
        Self {
            root,
            nodes,
            walk_findings,
            store,
            config,
            deadline,
            now,
            index,
        }
    }

    /// The visited node for `identifier`, if the walk reached it
    pub fn node(&self, identifier: &ItemIdentifier) -> Option<&'a VisitedNode> {
        self.index.get(identifier).map(|&position| &self.nodes[position])
    }

    /// Timeout for one store lookup made by a checker
    pub fn call_timeout(&self) -> Duration {
        self.deadline.call_timeout(self.config.call_timeout())
    }
}

/// An independent rule evaluator
pub trait Checker: Send + Sync {
    fn kind(&self) -> CheckerKind;

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError>;
}

/// The built-in checker for `kind`
pub fn checker_for(kind: CheckerKind) -> Box<dyn Checker> {
    match kind {
        CheckerKind::Identity => Box::new(IdentityChecker),
        CheckerKind::Hierarchy => Box::new(HierarchyChecker),
        CheckerKind::WorkingSet => Box::new(WorkingSetChecker),
        CheckerKind::Dangling => Box::new(DanglingReferenceChecker),
        CheckerKind::Path => Box::new(PathChecker),
    }
}

/// Built-in checkers the configuration leaves enabled
pub fn enabled_checkers(config: &AuditConfig) -> Vec<Box<dyn Checker>> {
    CheckerKind::ALL
        .into_iter()
        .filter(|kind| config.is_enabled(*kind))
        .map(checker_for)
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_kind_parses_from_name() {
        for kind in CheckerKind::ALL {
            assert_eq!(kind.as_str().parse::<CheckerKind>().unwrap(), kind);
        }
        assert!("spelling".parse::<CheckerKind>().is_err());
    }

    #[test]
    fn enabled_checkers_respects_config() {
        let config = AuditConfig::default().with_disabled(CheckerKind::Path);
        let kinds: Vec<_> = enabled_checkers(&config).iter().map(|c| c.kind()).collect();
        assert_eq!(kinds.len(), 4);
        assert!(!kinds.contains(&CheckerKind::Path));
    }
}
