use super::{CheckContext, CheckError, Checker, CheckerKind};
use crate::finding::{Finding, Rule};

/// Every visited item must declare, as its parent, the item whose listing
/// led to it. The walk root is exempt: it was requested, not discovered.
pub struct IdentityChecker;

impl Checker for IdentityChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::Identity
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let mut findings = Vec::new();

        for node in ctx.nodes {
            let Some(discovered_by) = &node.discovered_by else {
                continue;
            };
            if node.record.parent.as_ref() == Some(discovered_by) {
                continue;
            }

            let declared = node
                .record
                .parent
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "<root>".to_string());
            let mut related = vec![discovered_by.clone()];
            related.extend(node.record.parent.clone());

            findings.push(
                Finding::new(
                    Rule::ParentMismatch,
                    node.identifier(),
                    format!("declares parent {declared} but is listed under {discovered_by}"),
                )
                .with_related(related),
            );
        }

        Ok(findings)
    }
}
