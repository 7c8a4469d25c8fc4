//! Findings: detected invariant violations

use std::cmp::Reverse;

use mirror_store::ItemIdentifier;
use serde::{Deserialize, Serialize};

/// Severity of a finding; `Error` orders above `Warning`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The invariant a finding reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// An item was reached a second time during traversal
    CycleDetected,
    /// A listed child or declared parent has no record
    DanglingReference,
    /// Declared parent differs from the item that lists it
    ParentMismatch,
    /// Two siblings share a display name
    NameCollision,
    /// A working-set item is still a placeholder past its deadline
    StalePlaceholder,
    /// The walker hit its node budget
    TraversalTruncated,
    /// An item is listed under something that is not a folder
    ChildOfNonFolder,
    /// Remote path disagrees with the parent's path and the item's name
    PathMismatch,
    /// The sync engine recorded a failed upload
    UploadFailed,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CycleDetected => "CycleDetected",
            Self::DanglingReference => "DanglingReference",
            Self::ParentMismatch => "ParentMismatch",
            Self::NameCollision => "NameCollision",
            Self::StalePlaceholder => "StalePlaceholder",
            Self::TraversalTruncated => "TraversalTruncated",
            Self::ChildOfNonFolder => "ChildOfNonFolder",
            Self::PathMismatch => "PathMismatch",
            Self::UploadFailed => "UploadFailed",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::CycleDetected
            | Self::DanglingReference
            | Self::ParentMismatch
            | Self::NameCollision
            | Self::ChildOfNonFolder => Severity::Error,
            Self::StalePlaceholder
            | Self::TraversalTruncated
            | Self::PathMismatch
            | Self::UploadFailed => Severity::Warning,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One invariant violation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    pub rule: Rule,
    /// The offending item
    pub identifier: ItemIdentifier,
    /// Other items involved, such as the siblings of a name collision
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<ItemIdentifier>,
    pub message: String,
}

impl Finding {
    /// Create a finding with the rule's default severity.
    pub fn new(rule: Rule, identifier: &ItemIdentifier, message: impl Into<String>) -> Self {
        Self {
            severity: rule.severity(),
            rule,
            identifier: identifier.clone(),
            related: Vec::new(),
            message: message.into(),
        }
    }

    pub fn with_related(mut self, related: Vec<ItemIdentifier>) -> Self {
        self.related = related;
        self
    }

    /// Total report order: severity descending, rule name, identifier, then
    /// the remaining fields so equal findings end up adjacent.
    pub(crate) fn sort_key(
        &self,
    ) -> (
        Reverse<Severity>,
        &'static str,
        &ItemIdentifier,
        &str,
        &[ItemIdentifier],
    ) {
        (
            Reverse(self.severity),
            self.rule.as_str(),
            &self.identifier,
            &self.message,
            &self.related,
        )
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.rule, self.identifier, self.message
        )
    }
}
