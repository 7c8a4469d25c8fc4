use mirror_store::ItemStatus;

use super::{CheckContext, CheckError, Checker, CheckerKind};
use crate::finding::{Finding, Rule};

/// Working-set items are meant to stay resident. A working-set file that is
/// still a placeholder longer than the configured deadline after its last
/// modification was never materialized. Records without a modification time
/// cannot be aged and are skipped.
///
/// Also surfaces items whose last upload failed.
pub struct WorkingSetChecker;

impl Checker for WorkingSetChecker {
    fn kind(&self) -> CheckerKind {
        CheckerKind::WorkingSet
    }

    fn check(&self, ctx: &CheckContext<'_>) -> Result<Vec<Finding>, CheckError> {
        let deadline = chrono::Duration::from_std(ctx.config.placeholder_deadline())
            .map_err(|e| CheckError::internal(format!("placeholder deadline out of range: {e}")))?;
        let mut findings = Vec::new();

        for node in ctx.nodes {
            let record = &node.record;

            if record.in_working_set() && record.is_placeholder && !record.is_folder() {
                if let Some(modified) = record.last_modified {
                    let age = ctx.now.signed_duration_since(modified);
                    if age > deadline {
                        findings.push(Finding::new(
                            Rule::StalePlaceholder,
                            node.identifier(),
                            format!(
                                "in the working set but still a placeholder {}s after its last modification (limit {}s)",
                                age.num_seconds(),
                                deadline.num_seconds()
                            ),
                        ));
                    }
                }
            }

            if record.status == ItemStatus::UploadError {
                findings.push(Finding::new(
                    Rule::UploadFailed,
                    node.identifier(),
                    "last upload failed",
                ));
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::test_support::{nodes, run};
    use crate::config::AuditConfig;
    use crate::finding::Severity;
    use chrono::Utc;
    use mirror_store::{ItemKind, ItemRecord, MemoryStore};
    use pretty_assertions::assert_eq;

    fn root() -> ItemRecord {
        ItemRecord::new("A", None, "/", ItemKind::Folder)
    }

    fn placeholder(id: &str, age_secs: i64) -> ItemRecord {
        ItemRecord::new(id, Some("A"), id, ItemKind::File)
            .with_placeholder(true)
            .with_last_modified(Utc::now() - chrono::Duration::seconds(age_secs))
    }

    fn check(records: Vec<ItemRecord>) -> Vec<Finding> {
        let mut entries = vec![(root(), 0, None)];
        entries.extend(records.into_iter().map(|r| (r, 1, Some("A"))));
        run(
            &WorkingSetChecker,
            &MemoryStore::new(),
            &nodes(entries),
            &[],
            &AuditConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn stale_working_set_placeholder_is_a_warning() {
        let findings = check(vec![placeholder("old", 7_200).with_favorite_rank(1)]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, Rule::StalePlaceholder);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn fresh_placeholder_is_fine() {
        let findings = check(vec![placeholder("new", 60).with_tags()]);
        assert!(findings.is_empty());
    }

    #[test]
    fn placeholder_outside_working_set_is_fine() {
        let findings = check(vec![placeholder("old", 7_200)]);
        assert!(findings.is_empty());
    }

    #[test]
    fn placeholder_without_timestamp_is_skipped() {
        let record = ItemRecord::new("x", Some("A"), "x", ItemKind::File)
            .with_placeholder(true)
            .with_tags();
        assert!(check(vec![record]).is_empty());
    }

    #[test]
    fn upload_error_is_reported() {
        let record = ItemRecord::new("u", Some("A"), "u", ItemKind::File)
            .with_status(ItemStatus::UploadError);
        let findings = check(vec![record]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, Rule::UploadFailed);
    }

    #[test]
    fn unrepresentable_deadline_is_an_internal_error() {
        let config = AuditConfig {
            placeholder_deadline_secs: u64::MAX,
            ..AuditConfig::default()
        };
        let err = run(
            &WorkingSetChecker,
            &MemoryStore::new(),
            &nodes(vec![(root(), 0, None)]),
            &[],
            &config,
        )
        .unwrap_err();
        assert!(!err.is_infrastructure());
    }
}
