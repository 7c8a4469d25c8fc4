//! Building validators from files on disk

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use mirror_audit::{AuditConfig, Validator};
use mirror_store::SnapshotLoader;

use crate::{Error, Result};

/// One `--domain name=snapshot` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSpec {
    pub name: String,
    pub snapshot: PathBuf,
}

impl FromStr for DomainSpec {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self> {
        let invalid = || Error::InvalidDomainSpec {
            spec: spec.to_string(),
        };
        let (name, snapshot) = spec.split_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() || snapshot.is_empty() || name.contains(mirror_store::DOMAIN_DELIMITER) {
            return Err(invalid());
        }
        Ok(Self {
            name: name.to_string(),
            snapshot: PathBuf::from(snapshot),
        })
    }
}

/// The `[audit]` configuration at `path`, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<AuditConfig> {
    match path {
        Some(path) => Ok(AuditConfig::load(path)?),
        None => Ok(AuditConfig::default()),
    }
}

/// A validator over the mirror stored in a snapshot file.
pub fn load_validator(snapshot: &Path, config: AuditConfig) -> Result<Validator> {
    let store = SnapshotLoader::new().load_store(snapshot)?;
    tracing::debug!(snapshot = %snapshot.display(), items = store.len(), "Loaded snapshot");
    Ok(Validator::new(Arc::new(store), config))
}
