//! Colored terminal output for `mirror-debug check`

use std::fmt::Write as _;

use colored::Colorize;
use mirror_audit::{SessionFailure, Severity, ValidationReport};

/// Human-readable report: one line per finding, notes, then a summary.
pub fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} Validated {} (session #{})",
        "=>".blue().bold(),
        report.root.to_string().cyan(),
        report.session.sequence
    );

    for finding in &report.findings {
        let severity = match finding.severity {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warning => "WARN".yellow().bold(),
        };
        let _ = writeln!(
            out,
            "   {} {} {}: {}",
            severity,
            finding.rule.as_str().bold(),
            finding.identifier.to_string().cyan(),
            finding.message
        );
    }
    for note in &report.notes {
        let _ = writeln!(
            out,
            "   {} {} checker skipped: {}",
            "NOTE".dimmed(),
            note.checker,
            note.message
        );
    }

    let summary = &report.summary;
    let status = if summary.errors > 0 {
        "FAILED".red().bold()
    } else if report.is_clean() {
        "OK".green().bold()
    } else {
        "WARN".yellow().bold()
    };
    let _ = write!(
        out,
        "{} {} nodes visited, {} error(s), {} warning(s)",
        status, summary.nodes_visited, summary.errors, summary.warnings
    );
    if summary.truncated {
        let _ = write!(out, " {}", "(truncated)".yellow());
    }
    out.push('\n');
    out
}

/// One line describing why a session failed.
pub fn render_failure(failure: &SessionFailure) -> String {
    format!(
        "{} validation of {} failed while {}: {} ({})\n",
        "SESSION FAILED".red().bold(),
        failure.root.to_string().cyan(),
        failure.state,
        failure.message,
        failure.reason.to_string().dimmed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_audit::{
        FailureReason, Finding, ReportBuilder, Rule, SessionStamp, SessionState,
    };

    #[test]
    fn report_lists_findings_and_summary() {
        colored::control::set_override(false);
        let mut builder = ReportBuilder::new("A".into(), SessionStamp::next());
        builder
            .add(Finding::new(Rule::ParentMismatch, &"D".into(), "declares parent C"))
            .nodes_visited(4);

        let text = render_report(&builder.build());

        assert!(text.contains("ERROR ParentMismatch D: declares parent C"));
        assert!(text.ends_with("FAILED 4 nodes visited, 1 error(s), 0 warning(s)\n"));
    }

    #[test]
    fn failure_names_reason() {
        colored::control::set_override(false);
        let failure = SessionFailure {
            root: "A".into(),
            reason: FailureReason::Timeout,
            state: SessionState::Walking,
            message: "deadline exceeded".to_string(),
        };
        assert_eq!(
            render_failure(&failure),
            "SESSION FAILED validation of A failed while walking: deadline exceeded (timeout)\n"
        );
    }
}
