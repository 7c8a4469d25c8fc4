//! Report aggregation
//!
//! [`ReportBuilder`] collects the findings of one session and produces a
//! [`ValidationReport`] whose order depends only on the finding set: findings
//! are sorted by severity (errors first), rule name and identifier, and exact
//! duplicates collapse. Building twice from the same input yields identical
//! reports, whatever order the findings arrived in.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use mirror_store::ItemIdentifier;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::finding::{Finding, Rule, Severity};

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Identity of one validation session in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStamp {
    /// Process-wide, strictly increasing
    pub sequence: u64,
    pub started_at: DateTime<Utc>,
}

impl SessionStamp {
    pub fn next() -> Self {
        Self {
            sequence: SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            started_at: Utc::now(),
        }
    }
}

/// A checker that was skipped because it failed internally
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionNote {
    pub checker: String,
    pub message: String,
}

/// Counts over the findings of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub errors: usize,
    pub warnings: usize,
    pub nodes_visited: usize,
    pub truncated: bool,
}

/// The result of a completed validation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub root: ItemIdentifier,
    pub session: SessionStamp,
    pub findings: Vec<Finding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<SessionNote>,
    pub summary: ReportSummary,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && self.notes.is_empty()
    }

    pub fn findings_for(&self, rule: Rule) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.rule == rule)
    }

    pub fn count(&self, rule: Rule) -> usize {
        self.findings_for(rule).count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text rendering, one finding per line.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Validation report for {} (session #{})",
            self.root, self.session.sequence
        );
        for finding in &self.findings {
            let _ = writeln!(out, "{finding}");
        }
        for note in &self.notes {
            let _ = writeln!(out, "note: {} skipped: {}", note.checker, note.message);
        }
        let _ = write!(
            out,
            "{} nodes visited, {} {}, {} {}",
            self.summary.nodes_visited,
            self.summary.errors,
            plural(self.summary.errors, "error", "errors"),
            self.summary.warnings,
            plural(self.summary.warnings, "warning", "warnings"),
        );
        if self.summary.truncated {
            out.push_str(" (truncated)");
        }
        out.push('\n');
        out
    }
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

/// Aggregates the findings of one session
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    root: ItemIdentifier,
    session: SessionStamp,
    findings: Vec<Finding>,
    notes: Vec<SessionNote>,
    nodes_visited: usize,
}

impl ReportBuilder {
    pub fn new(root: ItemIdentifier, session: SessionStamp) -> Self {
        Self {
            root,
            session,
            findings: Vec::new(),
            notes: Vec::new(),
            nodes_visited: 0,
        }
    }

    pub fn add(&mut self, finding: Finding) -> &mut Self {
        self.findings.push(finding);
        self
    }

    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) -> &mut Self {
        self.findings.extend(findings);
        self
    }

    pub fn note(&mut self, checker: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.notes.push(SessionNote {
            checker: checker.into(),
            message: message.into(),
        });
        self
    }

    pub fn nodes_visited(&mut self, count: usize) -> &mut Self {
        self.nodes_visited = count;
        self
    }

    pub fn build(&self) -> ValidationReport {
        let mut findings = self.findings.clone();
        findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        findings.dedup();

        let mut notes = self.notes.clone();
        notes.sort();
        notes.dedup();

        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        let summary = ReportSummary {
            errors,
            warnings: findings.len() - errors,
            nodes_visited: self.nodes_visited,
            truncated: findings.iter().any(|f| f.rule == Rule::TraversalTruncated),
        };

        ValidationReport {
            root: self.root.clone(),
            session: self.session,
            findings,
            notes,
            summary,
        }
    }
}
