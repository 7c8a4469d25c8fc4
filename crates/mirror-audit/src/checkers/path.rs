use super::{CheckContext, CheckError, Checker, CheckerKind};
use crate::finding::{Finding, Rule};

/// Where both an item and the item listing it carry a remote path, the
/// child's path must be the parent's path joined with the child's name.
pub struct PathChecker;

fn join(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{parent}{name}")
    } else {
        format!("{parent}/{name}")
    }
}

impl Checker for PathChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::Path
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let mut findings = Vec::new();

        for node in ctx.nodes {
            let Some(path) = &node.record.remote_path else {
                continue;
            };
            let parent_path = node
                .discovered_by
                .as_ref()
                .and_then(|id| ctx.node(id))
                .and_then(|parent| parent.record.remote_path.as_deref());
            let Some(parent_path) = parent_path else {
                continue;
            };

            let expected = join(parent_path, &node.record.name);
            if *path != expected {
                findings.push(Finding::new(
                    Rule::PathMismatch,
                    node.identifier(),
                    format!("remote path {path:?} does not match expected {expected:?}"),
                ));
            }
        }

        Ok(findings)
    }
}
