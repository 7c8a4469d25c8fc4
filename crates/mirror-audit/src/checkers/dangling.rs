use std::collections::HashSet;

use mirror_store::ItemIdentifier;

use super::{CheckContext, CheckError, Checker, CheckerKind};
use crate::finding::{Finding, Rule};

/// Unresolvable references.
///
/// Listed children without a record come from the walker. Declared parents
/// outside the visited subtree are looked up in the store; a parent that
/// does not exist is dangling too.
pub struct DanglingReferenceChecker;

impl Checker for DanglingReferenceChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::Dangling
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let mut findings: Vec<Finding> = ctx
            .walk_findings
            .iter()
            .filter(|f| f.rule == Rule::DanglingReference)
            .cloned()
            .collect();

        let mut missing: HashSet<&ItemIdentifier> = HashSet::new();
        let mut present: HashSet<&ItemIdentifier> = HashSet::new();

        for node in ctx.nodes {
            let Some(parent) = &node.record.parent else {
                continue;
            };
            if ctx.node(parent).is_some() || present.contains(parent) {
                continue;
            }

            let exists = if missing.contains(parent) {
                false
            } else {
                match ctx.store.resolve(parent, ctx.call_timeout()) {
                    Ok(_) => {
                        present.insert(parent);
                        true
                    }
                    Err(mirror_store::Error::NotFound { .. }) => {
                        missing.insert(parent);
                        false
                    }
                    Err(err) => return Err(CheckError::Store(err)),
                }
            };

            if !exists {
                findings.push(
                    Finding::new(
                        Rule::DanglingReference,
                        node.identifier(),
                        format!("declared parent {parent} has no record"),
                    )
                    .with_related(vec![parent.clone()]),
                );
            }
        }

        Ok(findings)
    }
}
