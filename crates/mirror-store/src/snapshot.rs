//! Snapshot files of a metadata mirror
//!
//! A snapshot lists records and, optionally, explicit children listings. A
//! parent without an entry in `listings` lists the records that declare it
//! as parent, in file order; an entry in `listings` replaces that derived
//! listing completely. This is how a snapshot expresses a mirror whose
//! structure disagrees with its declared parents.
//!
//! ```toml
//! [[items]]
//! identifier = "root"
//! name = "/"
//! kind = "folder"
//!
//! [[items]]
//! identifier = "a"
//! parent = "root"
//! name = "a.txt"
//!
//! [listings]
//! root = ["a", "missing"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, ItemIdentifier, ItemRecord, MemoryStore, Result, validate_identifier};

/// Serializable content of a metadata mirror
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub items: Vec<ItemRecord>,

    #[serde(default)]
    pub listings: BTreeMap<ItemIdentifier, Vec<ItemIdentifier>>,
}

impl StoreSnapshot {
    /// Check every identifier the snapshot mentions: record identifiers,
    /// declared parents, listing keys and listed children.
    pub fn validate(&self) -> Result<()> {
        for record in &self.items {
            validate_identifier(record.identifier.as_str())?;
            if let Some(parent) = &record.parent {
                validate_identifier(parent.as_str())?;
            }
        }
        for (parent, children) in &self.listings {
            validate_identifier(parent.as_str())?;
            for child in children {
                validate_identifier(child.as_str())?;
            }
        }
        Ok(())
    }

    /// Build a [`MemoryStore`] from this snapshot.
    ///
    /// A snapshot mentioning an invalid identifier anywhere is rejected
    /// before anything is inserted.
    pub fn into_store(self) -> Result<MemoryStore> {
        self.validate()?;
        let store = MemoryStore::new();
        for record in self.items {
            let listed_under = record
                .parent
                .clone()
                .filter(|parent| !self.listings.contains_key(parent));
            store.insert_listed(record, listed_under.as_ref())?;
        }
        for (parent, children) in self.listings {
            store.set_listing(&parent, children)?;
        }
        Ok(store)
    }
}

/// Format-agnostic snapshot loading.
///
/// Format is detected from the file extension:
/// - `.toml` -> TOML
/// - `.json` -> JSON
/// - `.yaml`, `.yml` -> YAML
#[derive(Debug, Default)]
pub struct SnapshotLoader;

impl SnapshotLoader {
    pub fn new() -> Self {
        Self
    }

    pub fn load(&self, path: &Path) -> Result<StoreSnapshot> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, &e))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();

        let parsed: std::result::Result<StoreSnapshot, (&str, String)> = match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| ("TOML", e.to_string())),
            "json" => serde_json::from_str(&content).map_err(|e| ("JSON", e.to_string())),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| ("YAML", e.to_string())),
            _ => return Err(Error::UnsupportedFormat { extension }),
        };

        let snapshot = parsed.map_err(|(format, message)| Error::SnapshotParse {
            path: path.to_path_buf(),
            format: format.into(),
            message,
        })?;

        tracing::debug!(
            path = %path.display(),
            items = snapshot.items.len(),
            listings = snapshot.listings.len(),
            "Loaded store snapshot"
        );
        Ok(snapshot)
    }

    /// Load a snapshot and build the store it describes.
    pub fn load_store(&self, path: &Path) -> Result<MemoryStore> {
        self.load(path)?.into_store()
    }
}
