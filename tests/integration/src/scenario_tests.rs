//! Golden snapshot scenarios, end to end
//!
//! Each snapshot under `test-fixtures/snapshots/` is loaded from disk,
//! validated, and checked against the findings it was written to provoke.

use mirror_audit::{AuditConfig, FailureReason, Rule, Severity, Validator};
use mirror_store::{ItemIdentifier, SnapshotLoader};
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const DEADLINE: Duration = Duration::from_secs(5);

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../test-fixtures/snapshots")
        .join(name)
}

fn validator(name: &str) -> Validator {
    let store = SnapshotLoader::new()
        .load_store(&fixture(name))
        .unwrap_or_else(|e| panic!("loading {name}: {e}"));
    Validator::new(Arc::new(store), AuditConfig::default())
}

fn rules(report: &mirror_audit::ValidationReport) -> Vec<(Rule, String)> {
    report
        .findings
        .iter()
        .map(|f| (f.rule, f.identifier.to_string()))
        .collect()
}

#[test]
fn test_parent_mismatch_snapshot() {
    let report = validator("parent-mismatch.toml")
        .validate(&"A".into(), DEADLINE)
        .unwrap();

    assert_eq!(rules(&report), vec![(Rule::ParentMismatch, "D".to_string())]);
    assert_eq!(report.summary.errors, 1);
    assert_eq!(report.summary.nodes_visited, 4);
}

#[test]
fn test_name_collision_snapshot() {
    let report = validator("name-collision.json")
        .validate(&"A".into(), DEADLINE)
        .unwrap();

    assert_eq!(rules(&report), vec![(Rule::NameCollision, "X".to_string())]);
    assert_eq!(
        report.findings[0].related,
        vec![ItemIdentifier::from("X"), ItemIdentifier::from("Y")]
    );
}

#[test]
fn test_cycle_snapshot() {
    let report = validator("cycle.yaml").validate(&"A".into(), DEADLINE).unwrap();

    assert_eq!(rules(&report), vec![(Rule::CycleDetected, "A".to_string())]);
    assert!(report.findings[0].message.contains("loops back"));
}

#[test]
fn test_cycle_snapshot_from_inside_the_loop() {
    let report = validator("cycle.yaml").validate(&"B".into(), DEADLINE).unwrap();

    // Entered at B, the loop comes back around to B; A is listed under C
    // although it declares no parent.
    assert_eq!(report.count(Rule::CycleDetected), 1);
    assert_eq!(report.count(Rule::ParentMismatch), 1);
}

#[test]
fn test_working_set_snapshot_has_only_warnings() {
    let report = validator("working-set.toml")
        .validate(&"root".into(), DEADLINE)
        .unwrap();

    assert!(!report.has_errors());
    assert_eq!(
        rules(&report),
        vec![
            (Rule::PathMismatch, "moved".to_string()),
            (Rule::StalePlaceholder, "fav".to_string()),
            (Rule::UploadFailed, "moved".to_string()),
        ]
    );
    assert!(report.findings.iter().all(|f| f.severity == Severity::Warning));
}

#[test]
fn test_domain_snapshot_dangling_and_collision() {
    let report = validator("docs-domain.json")
        .validate(&"docs:root".into(), DEADLINE)
        .unwrap();

    assert_eq!(
        rules(&report),
        vec![
            (Rule::DanglingReference, "docs:404".to_string()),
            (Rule::NameCollision, "docs:1".to_string()),
        ]
    );
}

#[test]
fn test_absent_root_in_snapshot() {
    let failure = validator("parent-mismatch.toml")
        .validate(&"Q".into(), DEADLINE)
        .unwrap_err();
    assert_eq!(failure.reason, FailureReason::NotFound);
}

#[test]
fn test_every_fixture_renders_stably() {
    for name in [
        "parent-mismatch.toml",
        "name-collision.json",
        "cycle.yaml",
        "working-set.toml",
        "docs-domain.json",
    ] {
        let validator = validator(name);
        let root = if name.starts_with("docs") {
            "docs:root"
        } else if name.starts_with("working") {
            "root"
        } else {
            "A"
        };
        let first = validator.validate(&root.into(), DEADLINE).unwrap();
        let second = validator.validate(&root.into(), DEADLINE).unwrap();

        let body = |text: String| text.lines().skip(1).collect::<Vec<_>>().join("\n");
        assert_eq!(
            body(first.render_text()),
            body(second.render_text()),
            "{name} must render identically across sessions"
        );
    }
}
