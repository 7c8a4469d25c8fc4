//! The accessor contract the validation engine consumes

use std::time::Duration;

use crate::{ItemIdentifier, ItemRecord, Result};

/// Read-only query interface over the metadata mirror.
///
/// Every call is bounded by `timeout`: an implementation that cannot answer
/// in time returns [`Error::Unavailable`](crate::Error::Unavailable) instead
/// of blocking. Implementations must be safe for concurrent readers and must
/// have no side effects.
pub trait ItemStore: Send + Sync {
    /// Fetch the record for `identifier`, or `NotFound`.
    fn resolve(&self, identifier: &ItemIdentifier, timeout: Duration) -> Result<ItemRecord>;

    /// Identifiers listed as children of `identifier`, in listing order.
    ///
    /// An identifier without a listing yields an empty sequence.
    fn children(&self, identifier: &ItemIdentifier, timeout: Duration)
    -> Result<Vec<ItemIdentifier>>;

    /// Resolve the declared parent of `identifier`.
    ///
    /// `Ok(None)` when the record declares the root sentinel. The timeout
    /// applies to each underlying call.
    fn parent(&self, identifier: &ItemIdentifier, timeout: Duration) -> Result<Option<ItemRecord>> {
        let record = self.resolve(identifier, timeout)?;
        match record.parent {
            Some(parent) => self.resolve(&parent, timeout).map(Some),
            None => Ok(None),
        }
    }
}

impl<S: ItemStore + ?Sized> ItemStore for std::sync::Arc<S> {
    fn resolve(&self, identifier: &ItemIdentifier, timeout: Duration) -> Result<ItemRecord> {
        (**self).resolve(identifier, timeout)
    }

    fn children(
        &self,
        identifier: &ItemIdentifier,
        timeout: Duration,
    ) -> Result<Vec<ItemIdentifier>> {
        (**self).children(identifier, timeout)
    }
}
