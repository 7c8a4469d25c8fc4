//! Shared test utilities for the item-mirror-audit workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`graph`]: [`GraphFixture`] builder for in-memory mirrors, including
//!   deliberately corrupted ones
//! - [`stores`]: store wrappers that inject latency or failures
//! - [`snapshot`]: [`SnapshotDir`] for writing snapshot files to disk

pub mod graph;
pub mod snapshot;
pub mod stores;

pub use graph::GraphFixture;
pub use snapshot::SnapshotDir;
pub use stores::{FailingStore, SlowStore};
