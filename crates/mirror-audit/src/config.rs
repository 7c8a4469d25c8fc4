//! Engine configuration
//!
//! Settings live under an `[audit]` table so the file can be shared with
//! other tooling:
//!
//! ```toml
//! [audit]
//! max_nodes = 5000
//! call_timeout_ms = 500
//! placeholder_deadline_secs = 600
//! case_insensitive_names = false
//! disabled_checkers = ["path"]
//! ```
//!
//! Every key is optional; missing keys take the [`AuditConfig::default`]
//! value.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::checkers::CheckerKind;
use crate::error::{Error, Result};

/// Tuning knobs for a [`Validator`](crate::Validator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Nodes the walker visits before it stops with `TraversalTruncated`
    pub max_nodes: usize,

    /// Upper bound for a single store call, clamped to the session deadline
    pub call_timeout_ms: u64,

    /// How long a working-set placeholder may stay unmaterialized
    pub placeholder_deadline_secs: u64,

    /// Compare sibling names case-insensitively
    pub case_insensitive_names: bool,

    pub disabled_checkers: Vec<CheckerKind>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_nodes: 10_000,
            call_timeout_ms: 2_000,
            placeholder_deadline_secs: 3_600,
            case_insensitive_names: true,
            disabled_checkers: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    audit: AuditConfig,
}

impl AuditConfig {
    /// Parse the `[audit]` table of a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content)?;
        file.audit.validated()
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn placeholder_deadline(&self) -> Duration {
        Duration::from_secs(self.placeholder_deadline_secs)
    }

    pub fn is_enabled(&self, kind: CheckerKind) -> bool {
        !self.disabled_checkers.contains(&kind)
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_disabled(mut self, kind: CheckerKind) -> Self {
        if !self.disabled_checkers.contains(&kind) {
            self.disabled_checkers.push(kind);
        }
        self
    }

    fn validated(self) -> Result<Self> {
        if self.max_nodes == 0 {
            return Err(Error::InvalidConfig {
                message: "max_nodes must be at least 1".to_string(),
            });
        }
        if self.call_timeout_ms == 0 {
            return Err(Error::InvalidConfig {
                message: "call_timeout_ms must be at least 1".to_string(),
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_yields_defaults() {
        let config = AuditConfig::from_toml_str("").unwrap();
        assert_eq!(config, AuditConfig::default());
    }

    #[test]
    fn audit_table_overrides_defaults() {
        let config = AuditConfig::from_toml_str(
            r#"
[audit]
max_nodes = 5
call_timeout_ms = 250
disabled_checkers = ["path", "working_set"]
"#,
        )
        .unwrap();

        assert_eq!(config.max_nodes, 5);
        assert_eq!(config.call_timeout(), Duration::from_millis(250));
        assert_eq!(config.placeholder_deadline(), Duration::from_secs(3_600));
        assert!(!config.is_enabled(CheckerKind::Path));
        assert!(!config.is_enabled(CheckerKind::WorkingSet));
        assert!(config.is_enabled(CheckerKind::Identity));
    }

    #[test]
    fn unknown_checker_name_is_rejected() {
        let err = AuditConfig::from_toml_str("[audit]\ndisabled_checkers = [\"spelling\"]\n")
            .unwrap_err();
        assert!(matches!(err, Error::TomlDe(_)));
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(AuditConfig::from_toml_str("[audit]\nmax_depth = 3\n").is_err());
    }

    #[test]
    fn zero_node_budget_is_invalid() {
        let err = AuditConfig::from_toml_str("[audit]\nmax_nodes = 0\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = AuditConfig::load(&dir.path().join("audit.toml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn with_disabled_does_not_duplicate() {
        let config = AuditConfig::default()
            .with_disabled(CheckerKind::Path)
            .with_disabled(CheckerKind::Path);
        assert_eq!(config.disabled_checkers, vec![CheckerKind::Path]);
    }
}
