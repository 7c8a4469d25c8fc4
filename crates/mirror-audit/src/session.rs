//! Validation sessions
//!
//! A session validates one root identifier and moves through
//!
//! ```text
//! Created -> Resolving -> Walking -> Checking -> Reporting -> Completed
//! ```
//!
//! with `Failed` reachable from every non-terminal state. A session either
//! completes with a full report or fails with a [`SessionFailure`]; findings
//! gathered before a failure are discarded, never returned as a partial
//! report.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use mirror_store::{ItemIdentifier, ItemRecord, ItemStore};
use serde::{Deserialize, Serialize};

use crate::checkers::{CheckContext, CheckError, Checker, enabled_checkers};
use crate::config::AuditConfig;
use crate::deadline::Deadline;
use crate::finding::{Finding, Rule};
use crate::report::{ReportBuilder, SessionStamp, ValidationReport};
use crate::walker::{GraphWalker, VisitedNode, WalkError, WalkEvent};

/// Lifecycle state of a validation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    Resolving,
    Walking,
    Checking,
    Reporting,
    Completed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Resolving => write!(f, "resolving"),
            Self::Walking => write!(f, "walking"),
            Self::Checking => write!(f, "checking"),
            Self::Reporting => write!(f, "reporting"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Reason code of a failed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// The root identifier has no record
    NotFound,
    /// The store could not answer in time
    StoreUnavailable,
    /// The session deadline passed
    Timeout,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::StoreUnavailable => write!(f, "store_unavailable"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// A session that ended in `Failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("validation of {root} failed while {state} ({reason}): {message}")]
pub struct SessionFailure {
    pub root: ItemIdentifier,
    pub reason: FailureReason,
    /// The state the session was in when it failed
    pub state: SessionState,
    pub message: String,
}

impl FailureReason {
    fn for_store_error(err: &mirror_store::Error) -> Self {
        match err {
            mirror_store::Error::NotFound { .. } | mirror_store::Error::InvalidIdentifier { .. } => {
                Self::NotFound
            }
            _ => Self::StoreUnavailable,
        }
    }
}

/// One validation request. Running consumes the session, so each session
/// reaches a terminal state exactly once.
pub struct ValidationSession<'a> {
    store: &'a dyn ItemStore,
    config: &'a AuditConfig,
    checkers: &'a [Box<dyn Checker>],
    root: ItemIdentifier,
    deadline: Deadline,
    stamp: SessionStamp,
    state: SessionState,
    history: Vec<SessionState>,
}

impl<'a> ValidationSession<'a> {
    pub fn new(
        store: &'a dyn ItemStore,
        config: &'a AuditConfig,
        checkers: &'a [Box<dyn Checker>],
        root: ItemIdentifier,
        budget: Duration,
    ) -> Self {
        Self {
            store,
            config,
            checkers,
            root,
            deadline: Deadline::after(budget),
            stamp: SessionStamp::next(),
            state: SessionState::Created,
            history: vec![SessionState::Created],
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        tracing::debug!(
            root = %self.root,
            session = self.stamp.sequence,
            from = %self.state,
            to = %next,
            "Session transition"
        );
        self.state = next;
        self.history.push(next);
    }

    fn fail(&mut self, reason: FailureReason, message: impl Into<String>) -> SessionFailure {
        let failure = SessionFailure {
            root: self.root.clone(),
            reason,
            state: self.state,
            message: message.into(),
        };
        self.transition(SessionState::Failed);
        tracing::info!(
            root = %self.root,
            session = self.stamp.sequence,
            %reason,
            elapsed_ms = self.deadline.elapsed().as_millis() as u64,
            "Validation failed"
        );
        failure
    }

    fn check_deadline(&mut self) -> Result<(), SessionFailure> {
        if self.deadline.expired() {
            let message = format!("deadline exceeded while {}", self.state);
            return Err(self.fail(FailureReason::Timeout, message));
        }
        Ok(())
    }

    /// Run the session to a terminal state.
    pub fn run(mut self) -> Result<ValidationReport, SessionFailure> {
        self.drive()
    }

    /// Like [`run`](Self::run), also returning every state the session
    /// passed through.
    pub fn run_with_history(
        mut self,
    ) -> (Result<ValidationReport, SessionFailure>, Vec<SessionState>) {
        let outcome = self.drive();
        (outcome, self.history)
    }

    fn drive(&mut self) -> Result<ValidationReport, SessionFailure> {
        let root_record = self.resolve_root()?;
        let (nodes, walk_findings) = self.walk(root_record)?;
        let mut builder = self.check(&nodes, &walk_findings)?;

        self.transition(SessionState::Reporting);
        builder.nodes_visited(nodes.len());
        let report = builder.build();
        self.check_deadline()?;
        self.transition(SessionState::Completed);

        tracing::info!(
            root = %self.root,
            session = self.stamp.sequence,
            findings = report.findings.len(),
            errors = report.summary.errors,
            nodes = report.summary.nodes_visited,
            elapsed_ms = self.deadline.elapsed().as_millis() as u64,
            "Validation completed"
        );
        Ok(report)
    }

    fn resolve_root(&mut self) -> Result<ItemRecord, SessionFailure> {
        self.transition(SessionState::Resolving);
        self.check_deadline()?;

        let timeout = self.deadline.call_timeout(self.config.call_timeout());
        match self.store.resolve(&self.root, timeout) {
            Ok(record) => Ok(record),
            Err(err) if self.deadline.expired() => {
                Err(self.fail(FailureReason::Timeout, err.to_string()))
            }
            Err(err) => Err(self.fail(FailureReason::for_store_error(&err), err.to_string())),
        }
    }

    fn walk(
        &mut self,
        root: ItemRecord,
    ) -> Result<(Vec<VisitedNode>, Vec<Finding>), SessionFailure> {
        self.transition(SessionState::Walking);

        let store = self.store;
        let mut nodes = Vec::new();
        let mut signals = Vec::new();
        let walker = GraphWalker::new(
            store,
            root,
            self.config.max_nodes,
            self.config.call_timeout(),
            self.deadline,
        );

        for event in walker {
            match event {
                Ok(WalkEvent::Visited(node)) => nodes.push(node),
                Ok(WalkEvent::Finding(finding)) => signals.push(finding),
                Err(WalkError::DeadlineExceeded { visited }) => {
                    let message = format!("deadline exceeded after visiting {visited} nodes");
                    return Err(self.fail(FailureReason::Timeout, message));
                }
                Err(WalkError::Store(err)) => {
                    let reason = if self.deadline.expired() {
                        FailureReason::Timeout
                    } else {
                        FailureReason::StoreUnavailable
                    };
                    return Err(self.fail(reason, err.to_string()));
                }
            }
        }

        Ok((nodes, signals))
    }

    fn check(
        &mut self,
        nodes: &[VisitedNode],
        signals: &[Finding],
    ) -> Result<ReportBuilder, SessionFailure> {
        self.transition(SessionState::Checking);

        let mut builder = ReportBuilder::new(self.root.clone(), self.stamp);
        // Truncation is the session's own record; checkers never see it.
        builder.extend(
            signals
                .iter()
                .filter(|f| f.rule == Rule::TraversalTruncated)
                .cloned(),
        );

        let (store, config, checkers) = (self.store, self.config, self.checkers);
        let root = self.root.clone();
        let ctx = CheckContext::new(
            &root,
            nodes,
            signals,
            store,
            config,
            self.deadline,
            Utc::now(),
        );

        for checker in checkers {
            self.check_deadline()?;
            match checker.check(&ctx) {
                Ok(findings) => {
                    builder.extend(findings);
                }
                Err(err) if err.is_infrastructure() => {
                    let reason = if self.deadline.expired() {
                        FailureReason::Timeout
                    } else {
                        FailureReason::StoreUnavailable
                    };
                    return Err(self.fail(reason, format!("{} checker: {err}", checker.kind())));
                }
                Err(err) => {
                    tracing::warn!(
                        root = %self.root,
                        session = self.stamp.sequence,
                        checker = %checker.kind(),
                        error = %err,
                        "Checker failed, skipping"
                    );
                    builder.note(checker.kind().as_str(), failure_message(&err));
                }
            }
        }
        self.check_deadline()?;

        Ok(builder)
    }
}

fn failure_message(err: &CheckError) -> String {
    match err {
        CheckError::Store(store) => format!("store lookup failed: {store}"),
        CheckError::Internal { message } => message.clone(),
    }
}

/// The validation engine: a store handle plus the checkers to run.
///
/// Cheap to share across threads; each [`validate`](Self::validate) call
/// runs an independent session.
pub struct Validator {
    store: Arc<dyn ItemStore>,
    config: AuditConfig,
    checkers: Vec<Box<dyn Checker>>,
}

impl Validator {
    /// A validator running every checker the configuration enables.
    pub fn new(store: Arc<dyn ItemStore>, config: AuditConfig) -> Self {
        let checkers = enabled_checkers(&config);
        Self::with_checkers(store, config, checkers)
    }

    pub fn with_checkers(
        store: Arc<dyn ItemStore>,
        config: AuditConfig,
        checkers: Vec<Box<dyn Checker>>,
    ) -> Self {
        Self {
            store,
            config,
            checkers,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    /// Validate the subtree rooted at `root` within `deadline`.
    pub fn validate(
        &self,
        root: &ItemIdentifier,
        deadline: Duration,
    ) -> Result<ValidationReport, SessionFailure> {
        ValidationSession::new(
            self.store.as_ref(),
            &self.config,
            &self.checkers,
            root.clone(),
            deadline,
        )
        .run()
    }
}
