//! Read-only accessor over the item metadata mirror
//!
//! This crate models the locally cached metadata of a remote file tree and
//! provides the query surface the validation engine consumes:
//!
//! - **Identifiers**: [`ItemIdentifier`], an opaque token with an optional
//!   domain prefix
//! - **Records**: [`ItemRecord`], one immutable metadata snapshot per item
//! - **Accessor**: the [`ItemStore`] trait (`resolve`, `children`, `parent`),
//!   every call bounded by a caller-supplied timeout
//! - **In-memory mirror**: [`MemoryStore`], reader-safe with a single writer
//! - **Snapshots**: [`SnapshotLoader`] reads a store from TOML, JSON or YAML
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use mirror_store::{ItemKind, ItemRecord, ItemStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.insert(ItemRecord::new("root", None, "/", ItemKind::Folder)).unwrap();
//! store.insert(ItemRecord::new("a", Some("root"), "a.txt", ItemKind::File)).unwrap();
//!
//! let children = store.children(&"root".into(), Duration::from_millis(50)).unwrap();
//! assert_eq!(children.len(), 1);
//! ```

pub mod error;
pub mod identifier;
pub mod memory;
pub mod record;
pub mod snapshot;
pub mod store;

pub use error::{Error, Result};
pub use identifier::{DOMAIN_DELIMITER, ItemIdentifier, validate_identifier};
pub use memory::MemoryStore;
pub use record::{ItemKind, ItemRecord, ItemStatus};
pub use snapshot::{SnapshotLoader, StoreSnapshot};
pub use store::ItemStore;
