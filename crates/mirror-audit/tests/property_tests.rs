use mirror_audit::{AuditConfig, Finding, ReportBuilder, Rule, SessionStamp, Validator};
use mirror_store::{ItemIdentifier, ItemKind, ItemRecord, MemoryStore};
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const DEADLINE: Duration = Duration::from_secs(10);

/// A random tree: node `i > 0` hangs below `parents[i - 1] % i`.
fn tree_store(parents: &[usize]) -> MemoryStore {
    let store = MemoryStore::new();
    store
        .insert(ItemRecord::new("n0", None, "n0", ItemKind::Folder))
        .unwrap();
    for (offset, parent) in parents.iter().enumerate() {
        let i = offset + 1;
        let parent = format!("n{}", parent % i);
        store
            .insert(ItemRecord::new(
                format!("n{i}"),
                Some(parent.as_str()),
                format!("n{i}"),
                ItemKind::Folder,
            ))
            .unwrap();
    }
    store
}

/// Arbitrary listings over `n` folders, cycles and self-loops included.
fn graph_store(n: usize, edges: &[(usize, usize)]) -> MemoryStore {
    let store = MemoryStore::new();
    for i in 0..n {
        store
            .insert(ItemRecord::new(format!("n{i}"), None, format!("n{i}"), ItemKind::Folder))
            .unwrap();
    }
    let mut listings: HashMap<usize, Vec<ItemIdentifier>> = HashMap::new();
    for (from, to) in edges {
        listings
            .entry(from % n)
            .or_default()
            .push(ItemIdentifier::from(format!("n{}", to % n)));
    }
    for (from, children) in listings {
        store.set_listing(&format!("n{from}").into(), children).unwrap();
    }
    store
}

fn finding_strategy() -> impl Strategy<Value = Finding> {
    let rules = prop_oneof![
        Just(Rule::CycleDetected),
        Just(Rule::DanglingReference),
        Just(Rule::ParentMismatch),
        Just(Rule::NameCollision),
        Just(Rule::StalePlaceholder),
        Just(Rule::PathMismatch),
    ];
    (rules, "[a-e]", "[a-z ]{0,8}").prop_map(|(rule, id, message)| {
        Finding::new(rule, &ItemIdentifier::from(id), message)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn acyclic_trees_have_no_errors(parents in prop::collection::vec(0usize..1000, 0..60)) {
        let store = tree_store(&parents);
        let validator = Validator::new(Arc::new(store), AuditConfig::default());

        let report = validator.validate(&"n0".into(), DEADLINE).unwrap();

        prop_assert_eq!(report.summary.errors, 0);
        prop_assert_eq!(report.summary.nodes_visited, parents.len() + 1);
    }

    #[test]
    fn trees_larger_than_the_budget_are_truncated_but_complete(
        parents in prop::collection::vec(0usize..1000, 1..80),
        budget in 1usize..80,
    ) {
        let total = parents.len() + 1;
        let max_nodes = budget.min(total - 1);
        let config = AuditConfig::default().with_max_nodes(max_nodes);
        let validator = Validator::new(Arc::new(tree_store(&parents)), config);

        let report = validator.validate(&"n0".into(), DEADLINE).unwrap();

        prop_assert!(report.summary.truncated);
        prop_assert_eq!(report.summary.nodes_visited, max_nodes);
        prop_assert_eq!(report.count(Rule::TraversalTruncated), 1);
        prop_assert_eq!(report.summary.errors, 0);
    }

    #[test]
    fn arbitrary_graphs_terminate_with_one_cycle_finding_per_entry(
        n in 1usize..20,
        edges in prop::collection::vec((0usize..20, 0usize..20), 0..80),
    ) {
        let validator = Validator::new(Arc::new(graph_store(n, &edges)), AuditConfig::default());

        let report = validator.validate(&"n0".into(), DEADLINE).unwrap();

        prop_assert!(report.summary.nodes_visited <= n);
        let mut seen = std::collections::HashSet::new();
        for finding in report.findings_for(Rule::CycleDetected) {
            prop_assert!(seen.insert(finding.identifier.clone()));
        }
    }

    #[test]
    fn report_ignores_arrival_order_and_repeats(
        findings in prop::collection::vec(finding_strategy(), 0..30),
        seed in any::<u64>(),
    ) {
        let stamp = SessionStamp::next();

        let mut shuffled = findings.clone();
        // Deterministic rotation plus reversal stands in for a shuffle
        if !shuffled.is_empty() {
            let k = (seed as usize) % shuffled.len();
            shuffled.rotate_left(k);
            shuffled.reverse();
        }

        let mut forward = ReportBuilder::new("root".into(), stamp);
        forward.extend(findings.clone());
        let mut mixed = ReportBuilder::new("root".into(), stamp);
        mixed.extend(shuffled).extend(findings);

        prop_assert_eq!(forward.build().to_json().unwrap(), mixed.build().to_json().unwrap());
    }
}
