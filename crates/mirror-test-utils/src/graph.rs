//! [`GraphFixture`] builder for item graph scenarios.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use mirror_store::{ItemIdentifier, ItemKind, ItemRecord, MemoryStore, StoreSnapshot};

/// Declarative description of a metadata mirror.
///
/// Records are listed under their declared parent unless added with
/// [`listed_under`](Self::listed_under); [`listing`](Self::listing)
/// overrides a parent's children outright, which is how corrupted graphs
/// (cycles, dangling children) are expressed.
///
/// # Example
///
/// ```rust
/// use mirror_test_utils::GraphFixture;
///
/// let store = GraphFixture::new()
///     .folder("A", None)
///     .folder("B", Some("A"))
///     .listing("B", &["A"])
///     .build();
/// assert_eq!(store.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphFixture {
    records: Vec<(ItemRecord, Option<ItemIdentifier>)>,
    listings: Vec<(ItemIdentifier, Vec<ItemIdentifier>)>,
}

impl GraphFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary record, listed under its declared parent.
    pub fn record(mut self, record: ItemRecord) -> Self {
        let listed = record.parent.clone();
        self.records.push((record, listed));
        self
    }

    /// Add a folder whose name equals its identifier.
    pub fn folder(self, id: &str, parent: Option<&str>) -> Self {
        self.record(ItemRecord::new(id, parent, id, ItemKind::Folder))
    }

    pub fn file(self, id: &str, parent: &str, name: &str) -> Self {
        self.record(ItemRecord::new(id, Some(parent), name, ItemKind::File))
    }

    /// A working-set placeholder last modified `age_secs` ago.
    pub fn stale_placeholder(self, id: &str, parent: &str, age_secs: i64) -> Self {
        self.record(
            ItemRecord::new(id, Some(parent), id, ItemKind::File)
                .with_placeholder(true)
                .with_favorite_rank(1)
                .with_last_modified(Utc::now() - Duration::seconds(age_secs)),
        )
    }

    /// Add a record listed under `under` whatever parent it declares.
    pub fn listed_under(mut self, record: ItemRecord, under: &str) -> Self {
        self.records.push((record, Some(under.into())));
        self
    }

    /// Replace the children listing of `parent`.
    pub fn listing(mut self, parent: &str, children: &[&str]) -> Self {
        self.listings.push((
            parent.into(),
            children.iter().map(|c| ItemIdentifier::from(*c)).collect(),
        ));
        self
    }

    /// A root folder `root` with a chain of `depth` nested folders below it.
    ///
    /// Folders are named `n1`, `n2`, ... from the top.
    pub fn chain(root: &str, depth: usize) -> Self {
        let mut fixture = Self::new().folder(root, None);
        let mut parent = root.to_string();
        for level in 1..=depth {
            let id = format!("n{level}");
            fixture = fixture.folder(&id, Some(parent.as_str()));
            parent = id;
        }
        fixture
    }

    /// A complete tree with `fanout` children per folder, `depth` levels
    /// below `root`. Leaves are files.
    pub fn balanced(root: &str, fanout: usize, depth: usize) -> Self {
        let mut fixture = Self::new().folder(root, None);
        let mut level = vec![root.to_string()];
        for d in 1..=depth {
            let mut next = Vec::with_capacity(level.len() * fanout);
            for parent in &level {
                for i in 0..fanout {
                    let id = format!("{parent}.{i}");
                    fixture = if d == depth {
                        fixture.file(&id, parent, &format!("file{i}"))
                    } else {
                        fixture.record(ItemRecord::new(
                            id.as_str(),
                            Some(parent.as_str()),
                            format!("dir{i}"),
                            ItemKind::Folder,
                        ))
                    };
                    next.push(id);
                }
            }
            level = next;
        }
        fixture
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Populate a fresh [`MemoryStore`].
    ///
    /// # Panics
    /// Panics on duplicate or invalid identifiers.
    pub fn build(&self) -> MemoryStore {
        let store = MemoryStore::new();
        for (record, listed) in &self.records {
            store
                .insert_listed(record.clone(), listed.as_ref())
                .unwrap_or_else(|e| panic!("GraphFixture::build: {e}"));
        }
        for (parent, children) in &self.listings {
            store
                .set_listing(parent, children.clone())
                .unwrap_or_else(|e| panic!("GraphFixture::build: {e}"));
        }
        store
    }

    pub fn build_arc(&self) -> Arc<MemoryStore> {
        Arc::new(self.build())
    }

    /// The same mirror as a serializable snapshot.
    ///
    /// Parents whose listing differs from what the declared parents imply
    /// get an explicit listing.
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut snapshot = StoreSnapshot {
            items: self.records.iter().map(|(record, _)| record.clone()).collect(),
            ..StoreSnapshot::default()
        };

        let parents: BTreeSet<&ItemIdentifier> = self
            .records
            .iter()
            .flat_map(|(record, listed)| record.parent.iter().chain(listed.iter()))
            .collect();
        for parent in parents {
            let listed: Vec<ItemIdentifier> = self
                .records
                .iter()
                .filter(|(_, under)| under.as_ref() == Some(parent))
                .map(|(record, _)| record.identifier.clone())
                .collect();
            let declared: Vec<&ItemIdentifier> = self
                .records
                .iter()
                .filter(|(record, _)| record.parent.as_ref() == Some(parent))
                .map(|(record, _)| &record.identifier)
                .collect();
            if !listed.iter().eq(declared.into_iter()) {
                snapshot.listings.insert(parent.clone(), listed);
            }
        }

        for (parent, children) in &self.listings {
            snapshot.listings.insert(parent.clone(), children.clone());
        }
        snapshot
    }
}
