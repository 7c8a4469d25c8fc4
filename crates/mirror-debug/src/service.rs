//! The validation capability the service exposes

use std::sync::Arc;
use std::time::Duration;

use mirror_audit::{SessionFailure, ValidationReport, Validator};
use mirror_store::ItemIdentifier;

/// Something that can validate the subtree below an identifier.
///
/// Calls block for at most `deadline`; the server runs them off the async
/// executor.
pub trait ValidationService: Send + Sync {
    fn validate(
        &self,
        root: &ItemIdentifier,
        deadline: Duration,
    ) -> Result<ValidationReport, SessionFailure>;
}

impl ValidationService for Validator {
    fn validate(
        &self,
        root: &ItemIdentifier,
        deadline: Duration,
    ) -> Result<ValidationReport, SessionFailure> {
        Validator::validate(self, root, deadline)
    }
}

impl<T: ValidationService + ?Sized> ValidationService for Arc<T> {
    fn validate(
        &self,
        root: &ItemIdentifier,
        deadline: Duration,
    ) -> Result<ValidationReport, SessionFailure> {
        (**self).validate(root, deadline)
    }
}
