//! In-memory metadata mirror
//!
//! `MemoryStore` keeps records and children listings behind one `RwLock`.
//! Readers never wait longer than the timeout they pass in; writers are the
//! sync engine (or a test fixture) and are expected to be single.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};
use std::time::{Duration, Instant};

use crate::{Error, ItemIdentifier, ItemRecord, ItemStore, Result, validate_identifier};

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<ItemIdentifier, ItemRecord>,
    listings: HashMap<ItemIdentifier, Vec<ItemIdentifier>>,
}

/// Reader-safe in-memory item store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache a record and append it to its declared parent's listing.
    pub fn insert(&self, record: ItemRecord) -> Result<()> {
        let listed_under = record.parent.clone();
        self.insert_listed(record, listed_under.as_ref())
    }

    /// Cache a record and append it to the listing of `listed_under` only,
    /// regardless of the parent the record declares.
    ///
    /// `None` caches the record without listing it anywhere.
    pub fn insert_listed(
        &self,
        record: ItemRecord,
        listed_under: Option<&ItemIdentifier>,
    ) -> Result<()> {
        validate_identifier(record.identifier.as_str())?;
        if let Some(parent) = &record.parent {
            validate_identifier(parent.as_str())?;
        }
        if let Some(listed_under) = listed_under {
            validate_identifier(listed_under.as_str())?;
        }

        let mut inner = self.write_guard()?;
        if inner.records.contains_key(&record.identifier) {
            return Err(Error::DuplicateIdentifier {
                identifier: record.identifier,
            });
        }
        if let Some(parent) = listed_under {
            inner
                .listings
                .entry(parent.clone())
                .or_default()
                .push(record.identifier.clone());
        }
        inner.records.insert(record.identifier.clone(), record);
        Ok(())
    }

    /// Replace the children listing of `parent`.
    ///
    /// Listed identifiers need not have records; such entries surface as
    /// dangling references during validation.
    pub fn set_listing(&self, parent: &ItemIdentifier, children: Vec<ItemIdentifier>) -> Result<()> {
        validate_identifier(parent.as_str())?;
        for child in &children {
            validate_identifier(child.as_str())?;
        }

        let mut inner = self.write_guard()?;
        inner.listings.insert(parent.clone(), children);
        Ok(())
    }

    /// Drop a record and its own listing.
    ///
    /// Listings of other items that mention the identifier are left as is.
    pub fn remove(&self, identifier: &ItemIdentifier) -> Result<Option<ItemRecord>> {
        let mut inner = self.write_guard()?;
        inner.listings.remove(identifier);
        Ok(inner.records.remove(identifier))
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| Error::unavailable(Duration::ZERO, "store lock poisoned"))
    }

    fn read_guard(&self, timeout: Duration) -> Result<RwLockReadGuard<'_, Inner>> {
        let started = Instant::now();
        loop {
            match self.inner.try_read() {
                Ok(guard) => return Ok(guard),
                Err(TryLockError::Poisoned(_)) => {
                    return Err(Error::unavailable(started.elapsed(), "store lock poisoned"));
                }
                Err(TryLockError::WouldBlock) => {
                    let waited = started.elapsed();
                    if waited >= timeout {
                        tracing::debug!(?waited, "Store read lock contended past timeout");
                        return Err(Error::unavailable(waited, "store is locked by a writer"));
                    }
                    std::thread::sleep(LOCK_POLL_INTERVAL.min(timeout - waited));
                }
            }
        }
    }
}

impl ItemStore for MemoryStore {
    fn resolve(&self, identifier: &ItemIdentifier, timeout: Duration) -> Result<ItemRecord> {
        let inner = self.read_guard(timeout)?;
        inner
            .records
            .get(identifier)
            .cloned()
            .ok_or_else(|| Error::not_found(identifier))
    }

    fn children(
        &self,
        identifier: &ItemIdentifier,
        timeout: Duration,
    ) -> Result<Vec<ItemIdentifier>> {
        let inner = self.read_guard(timeout)?;
        Ok(inner.listings.get(identifier).cloned().unwrap_or_default())
    }
}
