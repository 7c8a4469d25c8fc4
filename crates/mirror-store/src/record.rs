//! Cached item metadata records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ItemIdentifier;

/// Content-type tag of a cached item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    File,
    Folder,
    Symlink,
    Unknown,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Folder => write!(f, "folder"),
            Self::Symlink => write!(f, "symlink"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Transfer status the sync engine last recorded for an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Uploaded,
    Uploading,
    UploadError,
    Downloading,
}

/// Metadata for one item as cached by the sync engine.
///
/// Records are immutable snapshots from the engine's point of view. The
/// `parent` field is the parent the record *declares*; the structural
/// relation the walker follows comes from the store's children listings and
/// may disagree with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub identifier: ItemIdentifier,

    /// Declared parent; `None` is the root sentinel
    #[serde(default)]
    pub parent: Option<ItemIdentifier>,

    pub name: String,

    #[serde(default)]
    pub kind: ItemKind,

    /// Content version token
    #[serde(default)]
    pub version: Option<String>,

    /// Content has not been materialized locally
    #[serde(default)]
    pub is_placeholder: bool,

    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,

    #[serde(default)]
    pub size: Option<u64>,

    #[serde(default)]
    pub status: ItemStatus,

    #[serde(default)]
    pub favorite_rank: Option<i64>,

    #[serde(default)]
    pub tagged: bool,

    /// Path of the item on the remote side
    #[serde(default)]
    pub remote_path: Option<String>,
}

impl ItemRecord {
    pub fn new(
        identifier: impl Into<ItemIdentifier>,
        parent: Option<&str>,
        name: impl Into<String>,
        kind: ItemKind,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            parent: parent.map(ItemIdentifier::from),
            name: name.into(),
            kind,
            version: None,
            is_placeholder: false,
            last_modified: None,
            size: None,
            status: ItemStatus::default(),
            favorite_rank: None,
            tagged: false,
            remote_path: None,
        }
    }

    pub fn with_placeholder(mut self, is_placeholder: bool) -> Self {
        self.is_placeholder = is_placeholder;
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_favorite_rank(mut self, rank: i64) -> Self {
        self.favorite_rank = Some(rank);
        self
    }

    pub fn with_tags(mut self) -> Self {
        self.tagged = true;
        self
    }

    pub fn with_remote_path(mut self, path: impl Into<String>) -> Self {
        self.remote_path = Some(path.into());
        self
    }

    /// Whether the record declares the root sentinel as its parent
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    /// Working-set members are favorited or tagged items the sync engine
    /// keeps resident.
    pub fn in_working_set(&self) -> bool {
        self.favorite_rank.is_some() || self.tagged
    }
}
