use std::collections::HashMap;

use mirror_store::{ItemIdentifier, ItemKind};

use super::{CheckContext, CheckError, Checker, CheckerKind};
use crate::finding::{Finding, Rule};

/// Structural shape of the hierarchy:
///
/// - cycles signalled by the walker
/// - siblings sharing a display name
/// - items listed under a file or symlink
pub struct HierarchyChecker;

impl HierarchyChecker {
    fn name_key(ctx: &CheckContext<'_>, name: &str) -> String {
        if ctx.config.case_insensitive_names {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    }
}

impl Checker for HierarchyChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::Hierarchy
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let mut findings: Vec<Finding> = ctx
            .walk_findings
            .iter()
            .filter(|f| f.rule == Rule::CycleDetected)
            .cloned()
            .collect();

        // (listing parent, name key) -> siblings in traversal order
        let mut siblings: HashMap<(&ItemIdentifier, String), Vec<&ItemIdentifier>> = HashMap::new();
        let mut group_order = Vec::new();

        for node in ctx.nodes {
            let Some(parent_id) = &node.discovered_by else {
                continue;
            };

            let parent = ctx
                .node(parent_id)
                .filter(|p| matches!(p.record.kind, ItemKind::File | ItemKind::Symlink));
            if let Some(parent) = parent {
                findings.push(
                    Finding::new(
                        Rule::ChildOfNonFolder,
                        node.identifier(),
                        format!("listed under {parent_id}, which is a {}", parent.record.kind),
                    )
                    .with_related(vec![parent_id.clone()]),
                );
            }

            let key = (parent_id, Self::name_key(ctx, &node.record.name));
            let group = siblings.entry(key.clone()).or_default();
            if group.is_empty() {
                group_order.push(key);
            }
            group.push(node.identifier());
        }

        for key in group_order {
            let Some(group) = siblings.get(&key) else {
                continue;
            };
            if group.len() < 2 {
                continue;
            }
            let (parent_id, _) = key;
            let first = group[0];
            let name = ctx
                .node(first)
                .map(|n| n.record.name.as_str())
                .unwrap_or_default();
            let ids = group.iter().map(|id| id.as_str()).collect::<Vec<_>>().join(", ");
            findings.push(
                Finding::new(
                    Rule::NameCollision,
                    first,
                    format!(
                        "{} items named {name:?} under {parent_id} ({ids})",
                        group.len()
                    ),
                )
                .with_related(group.iter().map(|id| (*id).clone()).collect()),
            );
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{nodes, run};
    use crate::config::AuditConfig;
    use mirror_store::{ItemRecord, MemoryStore};
    use pretty_assertions::assert_eq;

    fn item(id: &str, parent: &str, name: &str, kind: ItemKind) -> ItemRecord {
        ItemRecord::new(id, Some(parent), name, kind)
    }

    fn root() -> ItemRecord {
        ItemRecord::new("A", None, "/", ItemKind::Folder)
    }

    #[test]
    fn duplicate_names_produce_one_collision_naming_both() {
        let walk = nodes(vec![
            (root(), 0, None),
            (item("X", "A", "note.txt", ItemKind::File), 1, Some("A")),
            (item("Y", "A", "note.txt", ItemKind::File), 1, Some("A")),
        ]);
        let findings =
            run(&HierarchyChecker, &MemoryStore::new(), &walk, &[], &AuditConfig::default())
                .unwrap();

        assert_eq!(findings.len(), 1);
        let finding = &findings[0];
        assert_eq!(finding.rule, Rule::NameCollision);
        assert_eq!(finding.identifier, ItemIdentifier::from("X"));
        assert_eq!(
            finding.related,
            vec![ItemIdentifier::from("X"), ItemIdentifier::from("Y")]
        );
        assert!(finding.message.contains("\"note.txt\""));
    }

    #[test]
    fn same_name_under_different_parents_is_fine() {
        let walk = nodes(vec![
            (root(), 0, None),
            (item("B", "A", "b", ItemKind::Folder), 1, Some("A")),
            (item("X", "B", "note.txt", ItemKind::File), 2, Some("B")),
            (item("Y", "A", "note.txt", ItemKind::File), 1, Some("A")),
        ]);
        let findings =
            run(&HierarchyChecker, &MemoryStore::new(), &walk, &[], &AuditConfig::default())
                .unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn case_sensitivity_follows_config() {
        let walk = nodes(vec![
            (root(), 0, None),
            (item("X", "A", "Note.txt", ItemKind::File), 1, Some("A")),
            (item("Y", "A", "note.txt", ItemKind::File), 1, Some("A")),
        ]);
        let store = MemoryStore::new();

        let insensitive = run(&HierarchyChecker, &store, &walk, &[], &AuditConfig::default()).unwrap();
        assert_eq!(insensitive.len(), 1);

        let config = AuditConfig {
            case_insensitive_names: false,
            ..AuditConfig::default()
        };
        let sensitive = run(&HierarchyChecker, &store, &walk, &[], &config).unwrap();
        assert!(sensitive.is_empty());
    }

    #[test]
    fn child_of_file_is_reported() {
        let walk = nodes(vec![
            (root(), 0, None),
            (item("F", "A", "f.txt", ItemKind::File), 1, Some("A")),
            (item("G", "F", "g.txt", ItemKind::File), 2, Some("F")),
        ]);
        let findings =
            run(&HierarchyChecker, &MemoryStore::new(), &walk, &[], &AuditConfig::default())
                .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, Rule::ChildOfNonFolder);
        assert_eq!(findings[0].identifier, ItemIdentifier::from("G"));
    }

    #[test]
    fn forwards_walker_cycles_only() {
        let walk = nodes(vec![(root(), 0, None)]);
        let signals = vec![
            Finding::new(Rule::CycleDetected, &"A".into(), "loop"),
            Finding::new(Rule::DanglingReference, &"ghost".into(), "missing"),
        ];
        let findings =
            run(&HierarchyChecker, &MemoryStore::new(), &walk, &signals, &AuditConfig::default())
                .unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, Rule::CycleDetected);
    }
}
