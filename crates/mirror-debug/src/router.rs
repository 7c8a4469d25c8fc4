//! Routing validation requests to per-domain services
//!
//! Each sync domain has its own mirror and therefore its own service. An
//! identifier carrying a `<domain>:` prefix routes to that domain; an
//! identifier without one (such as a root container) routes to the default
//! service, unless the caller names a domain explicitly.

use std::collections::BTreeMap;
use std::sync::Arc;

use mirror_audit::AuditConfig;
use mirror_store::ItemIdentifier;

use crate::service::ValidationService;
use crate::setup::{DomainSpec, load_validator};
use crate::{Error, Result};

/// Domain key to validation service
#[derive(Default)]
pub struct ServiceRouter {
    domains: BTreeMap<String, Arc<dyn ValidationService>>,
    default: Option<Arc<dyn ValidationService>>,
}

impl ServiceRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` for `domain`.
    pub fn with_domain(
        mut self,
        domain: impl Into<String>,
        service: Arc<dyn ValidationService>,
    ) -> Result<Self> {
        let domain = domain.into();
        if self.domains.contains_key(&domain) {
            return Err(Error::DuplicateDomain { domain });
        }
        self.domains.insert(domain, service);
        Ok(self)
    }

    /// Service for identifiers without a domain prefix
    pub fn with_default(mut self, service: Arc<dyn ValidationService>) -> Self {
        self.default = Some(service);
        self
    }

    /// Load one validator per `--domain` spec, sharing `config`.
    ///
    /// With a single domain, that domain also serves unprefixed
    /// identifiers.
    pub fn from_specs(specs: &[DomainSpec], config: &AuditConfig) -> Result<Self> {
        let mut router = Self::new();
        for spec in specs {
            let validator: Arc<dyn ValidationService> =
                Arc::new(load_validator(&spec.snapshot, config.clone())?);
            if specs.len() == 1 {
                router = router.with_default(Arc::clone(&validator));
            }
            router = router.with_domain(spec.name.clone(), validator)?;
        }
        Ok(router)
    }

    /// Registered domain keys, sorted
    pub fn domains(&self) -> Vec<&str> {
        self.domains.keys().map(String::as_str).collect()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// The service responsible for `identifier`.
    ///
    /// An explicit `domain` takes precedence over the identifier's prefix.
    pub fn route(
        &self,
        identifier: &ItemIdentifier,
        domain: Option<&str>,
    ) -> Result<Arc<dyn ValidationService>> {
        match domain.or_else(|| identifier.domain()) {
            Some(domain) => self
                .domains
                .get(domain)
                .cloned()
                .ok_or_else(|| Error::DomainNotFound {
                    domain: domain.to_string(),
                }),
            None => self.default.clone().ok_or_else(|| Error::DomainNotFound {
                domain: String::new(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mirror_audit::{SessionFailure, ValidationReport, Validator};
    use mirror_test_utils::GraphFixture;
    use std::time::Duration;

    fn validator(root: &str) -> Arc<dyn ValidationService> {
        Arc::new(Validator::new(
            GraphFixture::chain(root, 1).build_arc(),
            AuditConfig::default(),
        ))
    }

    fn run(
        router: &ServiceRouter,
        id: &str,
        domain: Option<&str>,
    ) -> Result<std::result::Result<ValidationReport, SessionFailure>> {
        let id = ItemIdentifier::from(id);
        Ok(router.route(&id, domain)?.validate(&id, Duration::from_secs(1)))
    }

    fn router() -> ServiceRouter {
        ServiceRouter::new()
            .with_domain("docs", validator("docs:root"))
            .unwrap()
            .with_domain("photos", validator("photos:root"))
            .unwrap()
            .with_default(validator("root"))
    }

    #[test]
    fn routes_by_identifier_prefix() {
        let router = router();
        assert!(run(&router, "docs:root", None).unwrap().is_ok());
        assert!(run(&router, "photos:root", None).unwrap().is_ok());
        // docs:root lives only in the docs mirror
        assert!(run(&router, "docs:root", Some("photos")).unwrap().is_err());
    }

    #[test]
    fn unprefixed_identifier_uses_default() {
        assert!(run(&router(), "root", None).unwrap().is_ok());
    }

    #[test]
    fn unknown_domain_is_domain_not_found() {
        let err = run(&router(), "music:root", None).unwrap_err();
        assert!(matches!(err, Error::DomainNotFound { domain } if domain == "music"));
    }

    #[test]
    fn missing_default_is_domain_not_found() {
        let router = ServiceRouter::new()
            .with_domain("docs", validator("docs:root"))
            .unwrap();
        assert!(matches!(
            run(&router, "root", None),
            Err(Error::DomainNotFound { .. })
        ));
    }

    #[test]
    fn duplicate_domain_is_rejected() {
        let result = ServiceRouter::new()
            .with_domain("docs", validator("a"))
            .unwrap()
            .with_domain("docs", validator("b"));
        assert!(matches!(result, Err(Error::DuplicateDomain { .. })));
    }

    #[test]
    fn domains_are_sorted() {
        let router = ServiceRouter::new()
            .with_domain("photos", validator("a"))
            .unwrap()
            .with_domain("docs", validator("b"))
            .unwrap();
        assert_eq!(router.domains(), vec!["docs", "photos"]);
        assert!(!router.has_default());
    }
}
