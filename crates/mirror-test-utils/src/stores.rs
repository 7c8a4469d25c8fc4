//! Store wrappers that misbehave on purpose.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use mirror_store::{Error, ItemIdentifier, ItemRecord, ItemStore, Result};

/// Adds a fixed latency to every call of the wrapped store.
///
/// Honors the timeout contract: a call whose latency exceeds its timeout
/// waits out the timeout and returns `Unavailable`.
pub struct SlowStore<S> {
    inner: S,
    latency: Duration,
    calls: AtomicUsize,
}

impl<S: ItemStore> SlowStore<S> {
    pub fn new(inner: S, latency: Duration) -> Self {
        Self {
            inner,
            latency,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn delay(&self, timeout: Duration) -> Result<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.latency > timeout {
            std::thread::sleep(timeout);
            return Err(Error::unavailable(timeout, "injected latency"));
        }
        std::thread::sleep(self.latency);
        Ok(())
    }
}

impl<S: ItemStore> ItemStore for SlowStore<S> {
    fn resolve(&self, identifier: &ItemIdentifier, timeout: Duration) -> Result<ItemRecord> {
        self.delay(timeout)?;
        self.inner.resolve(identifier, timeout)
    }

    fn children(
        &self,
        identifier: &ItemIdentifier,
        timeout: Duration,
    ) -> Result<Vec<ItemIdentifier>> {
        self.delay(timeout)?;
        self.inner.children(identifier, timeout)
    }
}

/// Answers from the wrapped store except for chosen identifiers, whose
/// lookups fail with `Unavailable`.
pub struct FailingStore<S> {
    inner: S,
    fail_resolve: HashSet<ItemIdentifier>,
    fail_children: HashSet<ItemIdentifier>,
}

impl<S: ItemStore> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_resolve: HashSet::new(),
            fail_children: HashSet::new(),
        }
    }

    /// Fail every `resolve` of `identifier`.
    pub fn fail_resolve(mut self, identifier: &str) -> Self {
        self.fail_resolve.insert(identifier.into());
        self
    }

    /// Fail every `children` listing of `identifier`.
    pub fn fail_children(mut self, identifier: &str) -> Self {
        self.fail_children.insert(identifier.into());
        self
    }
}

impl<S: ItemStore> ItemStore for FailingStore<S> {
    fn resolve(&self, identifier: &ItemIdentifier, timeout: Duration) -> Result<ItemRecord> {
        if self.fail_resolve.contains(identifier) {
            return Err(Error::unavailable(Duration::ZERO, "injected failure"));
        }
        self.inner.resolve(identifier, timeout)
    }

    fn children(
        &self,
        identifier: &ItemIdentifier,
        timeout: Duration,
    ) -> Result<Vec<ItemIdentifier>> {
        if self.fail_children.contains(identifier) {
            return Err(Error::unavailable(Duration::ZERO, "injected failure"));
        }
        self.inner.children(identifier, timeout)
    }
}
