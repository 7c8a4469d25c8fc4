//! [`SnapshotDir`]: snapshot files in a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use mirror_store::StoreSnapshot;
use tempfile::TempDir;

use crate::GraphFixture;

/// A temporary directory holding snapshot and config files.
pub struct SnapshotDir {
    temp_dir: TempDir,
}

impl Default for SnapshotDir {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotDir {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `fixture` as a JSON snapshot named `file_name`.
    pub fn write_fixture(&self, file_name: &str, fixture: &GraphFixture) -> PathBuf {
        self.write_snapshot(file_name, &fixture.snapshot())
    }

    pub fn write_snapshot(&self, file_name: &str, snapshot: &StoreSnapshot) -> PathBuf {
        let content = serde_json::to_string_pretty(snapshot).unwrap();
        self.write(file_name, &content)
    }

    /// Write raw file content, e.g. a TOML snapshot or an `[audit]` config.
    pub fn write(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.root().join(file_name);
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("SnapshotDir::write {}: {e}", path.display()));
        path
    }
}
