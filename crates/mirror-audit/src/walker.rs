//! Depth-first traversal of the item graph
//!
//! The walker follows the store's children listings from a root record using
//! an explicit frame stack and a visited set keyed by identifier, so a
//! corrupted graph can neither recurse without bound nor loop forever:
//!
//! 1. The root is visited at depth 0.
//! 2. A popped frame whose identifier was already visited yields
//!    `CycleDetected` (once per identifier) and is not expanded again.
//! 3. A frame that does not resolve yields `DanglingReference`; its branch
//!    ends there.
//! 4. Otherwise the node is recorded and its children pushed at depth + 1,
//!    so they are visited in listing order.
//! 5. Visiting more than `max_nodes` nodes yields `TraversalTruncated` and
//!    ends the walk.

use std::collections::{HashMap, HashSet};
use std::iter::FusedIterator;
use std::time::Duration;

use mirror_store::{ItemIdentifier, ItemRecord, ItemStore};

use crate::deadline::Deadline;
use crate::finding::{Finding, Rule};

/// A record together with where the walker found it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedNode {
    pub record: ItemRecord,
    pub depth: usize,
    /// The item whose listing led here; `None` for the walk root
    pub discovered_by: Option<ItemIdentifier>,
}

impl VisitedNode {
    pub fn identifier(&self) -> &ItemIdentifier {
        &self.record.identifier
    }
}

/// One step of a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkEvent {
    Visited(VisitedNode),
    Finding(Finding),
}

/// Conditions that abort a walk
#[derive(Debug, Clone, thiserror::Error)]
pub enum WalkError {
    #[error(transparent)]
    Store(mirror_store::Error),

    #[error("deadline exceeded after visiting {visited} nodes")]
    DeadlineExceeded { visited: usize },
}

#[derive(Debug)]
struct Frame {
    identifier: ItemIdentifier,
    depth: usize,
    discovered_by: Option<ItemIdentifier>,
}

/// Lazy, single-pass walk over the subtree below one root record.
///
/// The walk is not restartable; start a new walker for a new session.
pub struct GraphWalker<'a, S: ItemStore + ?Sized> {
    store: &'a S,
    deadline: Deadline,
    call_timeout: Duration,
    max_nodes: usize,
    walk_root: ItemIdentifier,
    pending_root: Option<ItemRecord>,
    stack: Vec<Frame>,
    /// Visited identifier -> the item that discovered it
    visited: HashMap<ItemIdentifier, Option<ItemIdentifier>>,
    reported_cycles: HashSet<ItemIdentifier>,
    truncated: bool,
    finished: bool,
}

impl<'a, S: ItemStore + ?Sized> GraphWalker<'a, S> {
    /// Walk the subtree below an already resolved root record.
    pub fn new(
        store: &'a S,
        root: ItemRecord,
        max_nodes: usize,
        call_timeout: Duration,
        deadline: Deadline,
    ) -> Self {
        Self {
            store,
            deadline,
            call_timeout,
            max_nodes,
            walk_root: root.identifier.clone(),
            pending_root: Some(root),
            stack: Vec::new(),
            visited: HashMap::new(),
            reported_cycles: HashSet::new(),
            truncated: false,
            finished: false,
        }
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn truncated(&self) -> bool {
        self.truncated
    }

    fn visit(
        &mut self,
        record: ItemRecord,
        depth: usize,
        discovered_by: Option<ItemIdentifier>,
    ) -> Result<VisitedNode, WalkError> {
        let timeout = self.deadline.call_timeout(self.call_timeout);
        let children = match self.store.children(&record.identifier, timeout) {
            Ok(children) => children,
            Err(mirror_store::Error::NotFound { .. }) => Vec::new(),
            Err(err) => return Err(WalkError::Store(err)),
        };

        self.visited
            .insert(record.identifier.clone(), discovered_by.clone());
        for child in children.into_iter().rev() {
            self.stack.push(Frame {
                identifier: child,
                depth: depth + 1,
                discovered_by: Some(record.identifier.clone()),
            });
        }

        Ok(VisitedNode {
            record,
            depth,
            discovered_by,
        })
    }

    /// Whether `candidate` lies on the discovery path leading to `from`.
    fn is_ancestor(&self, candidate: &ItemIdentifier, from: Option<&ItemIdentifier>) -> bool {
        let mut current = from;
        // The discovery chain is a tree path, so it is never longer than the
        // visited set.
        for _ in 0..=self.visited.len() {
            match current {
                Some(id) if id == candidate => return true,
                Some(id) => current = self.visited.get(id).and_then(Option::as_ref),
                None => return false,
            }
        }
        false
    }

    fn revisit_finding(&self, frame: &Frame) -> Finding {
        let via = frame
            .discovered_by
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        let mut related: Vec<ItemIdentifier> = frame.discovered_by.iter().cloned().collect();

        let message = if self.is_ancestor(&frame.identifier, frame.discovered_by.as_ref()) {
            format!("re-entered from descendant {via}; the hierarchy loops back to it")
        } else {
            // Listed under two parents: related names both listings, first
            // discoverer last.
            let first = self
                .visited
                .get(&frame.identifier)
                .and_then(Option::as_ref)
                .unwrap_or(&self.walk_root);
            related.push(first.clone());
            format!("shared child: reached again via {via} after first being reached via {first}")
        };
        Finding::new(Rule::CycleDetected, &frame.identifier, message).with_related(related)
    }

    fn step(&mut self) -> Option<Result<WalkEvent, WalkError>> {
        if let Some(root) = self.pending_root.take() {
            return Some(self.visit(root, 0, None).map(WalkEvent::Visited));
        }

        loop {
            let frame = self.stack.pop()?;

            if self.visited.contains_key(&frame.identifier) {
                if self.reported_cycles.insert(frame.identifier.clone()) {
                    return Some(Ok(WalkEvent::Finding(self.revisit_finding(&frame))));
                }
                continue;
            }

            if self.visited.len() >= self.max_nodes {
                self.truncated = true;
                self.finished = true;
                tracing::debug!(
                    root = %self.walk_root,
                    max_nodes = self.max_nodes,
                    pending = self.stack.len() + 1,
                    "Walk truncated"
                );
                let message = format!(
                    "stopped after {} nodes with {} listed items left unvisited",
                    self.max_nodes,
                    self.stack.len() + 1
                );
                return Some(Ok(WalkEvent::Finding(Finding::new(
                    Rule::TraversalTruncated,
                    &self.walk_root,
                    message,
                ))));
            }

            let timeout = self.deadline.call_timeout(self.call_timeout);
            return match self.store.resolve(&frame.identifier, timeout) {
                Ok(record) => Some(
                    self.visit(record, frame.depth, frame.discovered_by)
                        .map(WalkEvent::Visited),
                ),
                Err(mirror_store::Error::NotFound { .. }) => {
                    let via = frame
                        .discovered_by
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    let finding = Finding::new(
                        Rule::DanglingReference,
                        &frame.identifier,
                        format!("listed as a child of {via} but has no record"),
                    )
                    .with_related(frame.discovered_by.into_iter().collect());
                    Some(Ok(WalkEvent::Finding(finding)))
                }
                Err(err) => Some(Err(WalkError::Store(err))),
            };
        }
    }
}

impl<S: ItemStore + ?Sized> Iterator for GraphWalker<'_, S> {
    type Item = Result<WalkEvent, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.deadline.expired() {
            self.finished = true;
            return Some(Err(WalkError::DeadlineExceeded {
                visited: self.visited.len(),
            }));
        }

        let event = self.step();
        match &event {
            None | Some(Err(_)) => self.finished = true,
            Some(Ok(_)) => {}
        }
        event
    }
}

impl<S: ItemStore + ?Sized> FusedIterator for GraphWalker<'_, S> {}
