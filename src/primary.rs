//! Primary support checks.
//!
//! [`PrimarySupport`] validates the input domain, runs the delegation walk,
//! reports discoveries, and answers the key and authority queries built on top
//! of a resolution.

use tracing::{debug, info};

use crate::config::ResolverOptions;
use crate::domain::Domain;
use crate::error::ResolutionError;
use crate::events::DiscoveryEvents;
use crate::resolver::Resolver;
use crate::types::{PublicKey, ResolutionResult};

/// Entry point for checking whether domains are primary identity authorities
#[derive(Debug, Clone)]
pub struct PrimarySupport {
    resolver: Resolver,
    events: DiscoveryEvents,
}

impl PrimarySupport {
    pub fn new(
        options: &ResolverOptions,
        events: DiscoveryEvents,
    ) -> Result<Self, ResolutionError> {
        Ok(Self::with_resolver(Resolver::new(options)?, events))
    }

    pub fn with_resolver(resolver: Resolver, events: DiscoveryEvents) -> Self {
        Self { resolver, events }
    }

    pub fn events(&self) -> &DiscoveryEvents {
        &self.events
    }

    /// Checks whether `domain` supports the protocol, following delegations
    ///
    /// An invalid domain fails without any network activity. A supported
    /// result raises one discovery event for the principal; a disabled one
    /// raises none.
    pub async fn check_support(&self, domain: &str) -> Result<ResolutionResult, ResolutionError> {
        let principal = Domain::parse(domain)?;

        let result = match self.resolver.resolve(&principal).await {
            Ok(result) => result,
            Err(e) => {
                debug!("{e}");
                return Err(e);
            }
        };

        if result.is_disabled() {
            info!("{principal} has explicitly disabled browserid support");
        } else {
            self.events.emit(principal.clone());
            info!("{principal} is a valid browserid primary");
        }

        Ok(result)
    }

    /// The public key of the domain authoritative for `domain`
    pub async fn get_public_key(&self, domain: &str) -> Result<PublicKey, ResolutionError> {
        match self.check_support(domain).await {
            Ok(result) => result
                .public_key()
                .cloned()
                .ok_or_else(|| ResolutionError::PublicKeyUnavailable {
                    domain: domain.to_string(),
                    source: None,
                }),
            Err(e) => Err(ResolutionError::PublicKeyUnavailable {
                domain: domain.to_string(),
                source: Some(Box::new(e)),
            }),
        }
    }

    /// Whether `issuing_domain` may certify addresses at `email_domain`
    ///
    /// Only a supported authoritative domain qualifies; a disabled one or any
    /// failure to resolve is a plain `false`.
    pub async fn delegates_authority(&self, email_domain: &str, issuing_domain: &str) -> bool {
        match self.check_support(email_domain).await {
            Ok(result) => {
                !result.is_disabled() && result.authoritative_domain().as_str() == issuing_domain
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{delegation, disabled, supported, FakePrimaries};
    use tokio::sync::broadcast::error::TryRecvError;
    use url::Url;
    use wiremock::{matchers::any, Mock, MockServer, ResponseTemplate};

    fn support_for(primaries: &FakePrimaries) -> PrimarySupport {
        PrimarySupport::new(&primaries.options(), DiscoveryEvents::default()).unwrap()
    }

    async fn delegated_primaries() -> FakePrimaries {
        let mut primaries = FakePrimaries::new();
        primaries
            .serve("example.com", "example.com", delegation("idp.example.com"), 1)
            .await;
        primaries.serve("idp.example.com", "example.com", supported(), 1).await;
        primaries
    }

    #[tokio::test]
    async fn test_invalid_domain_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;
        let options =
            ResolverOptions::default().with_shim("", Url::parse(&server.uri()).unwrap());
        let support = PrimarySupport::new(&options, DiscoveryEvents::default()).unwrap();

        assert!(matches!(
            support.check_support("").await,
            Err(ResolutionError::InvalidDomain(_))
        ));
        assert!(matches!(
            support.check_support("not a domain").await,
            Err(ResolutionError::InvalidDomain(_))
        ));
    }

    #[tokio::test]
    async fn test_supported_emits_one_event_for_principal() {
        let primaries = delegated_primaries().await;
        let support = support_for(&primaries);
        let mut rx = support.events().subscribe();

        let result = support.check_support("example.com").await.unwrap();

        assert_eq!(result.authoritative_domain().as_str(), "idp.example.com");
        assert_eq!(rx.try_recv().unwrap().principal.as_str(), "example.com");
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_disabled_emits_nothing() {
        let mut primaries = FakePrimaries::new();
        primaries.serve("example.com", "example.com", disabled(), 1).await;
        let support = support_for(&primaries);
        let mut rx = support.events().subscribe();

        let result = support.check_support("example.com").await.unwrap();

        assert!(result.is_disabled());
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_failure_emits_nothing() {
        let mut primaries = FakePrimaries::new();
        primaries
            .respond("example.com", "example.com", ResponseTemplate::new(404), 1)
            .await;
        let support = support_for(&primaries);
        let mut rx = support.events().subscribe();

        let err = support.check_support("example.com").await.unwrap_err();

        assert!(matches!(err, ResolutionError::NotAPrimary { .. }));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_get_public_key() {
        let primaries = delegated_primaries().await;
        let support = support_for(&primaries);

        let key = support.get_public_key("example.com").await.unwrap();

        assert_eq!(key.0["algorithm"], "RS");
    }

    #[tokio::test]
    async fn test_get_public_key_of_disabled_domain() {
        let mut primaries = FakePrimaries::new();
        primaries.serve("example.com", "example.com", disabled(), 1).await;
        let support = support_for(&primaries);

        let err = support.get_public_key("example.com").await.unwrap_err();

        assert!(matches!(
            err,
            ResolutionError::PublicKeyUnavailable { source: None, .. }
        ));
        assert_eq!(err.to_string(), "can't get public key for example.com");
    }

    #[tokio::test]
    async fn test_get_public_key_wraps_resolution_error() {
        let support = support_for(&FakePrimaries::new());

        let err = support.get_public_key("").await.unwrap_err();

        match err {
            ResolutionError::PublicKeyUnavailable {
                source: Some(source),
                ..
            } => assert!(matches!(*source, ResolutionError::InvalidDomain(_))),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delegates_authority() {
        let primaries = delegated_primaries().await;
        let support = support_for(&primaries);

        assert!(support.delegates_authority("example.com", "idp.example.com").await);
    }

    #[tokio::test]
    async fn test_delegates_authority_to_other_issuer() {
        let primaries = delegated_primaries().await;
        let support = support_for(&primaries);

        assert!(!support.delegates_authority("example.com", "example.com").await);
    }

    #[tokio::test]
    async fn test_delegates_authority_to_disabled_issuer_is_false() {
        let mut primaries = FakePrimaries::new();
        primaries
            .serve("example.com", "example.com", delegation("idp.example.com"), 1)
            .await;
        primaries.serve("idp.example.com", "example.com", disabled(), 1).await;
        let support = support_for(&primaries);

        assert!(!support.delegates_authority("example.com", "idp.example.com").await);
    }

    #[tokio::test]
    async fn test_delegates_authority_on_error_is_false() {
        let mut primaries = FakePrimaries::new();
        primaries
            .serve("example.com", "example.com", delegation("example.com"), 1)
            .await;
        let support = support_for(&primaries);

        assert!(!support.delegates_authority("example.com", "example.com").await);
        assert!(!support.delegates_authority("", "example.com").await);
    }

    #[tokio::test]
    async fn test_concurrent_resolutions_are_independent() {
        let mut primaries = FakePrimaries::new();
        primaries.serve("good.example", "good.example", supported(), 1).await;
        primaries
            .respond("bad.example", "bad.example", ResponseTemplate::new(503), 1)
            .await;
        let support = support_for(&primaries);
        let mut rx = support.events().subscribe();

        let (good, bad) = tokio::join!(
            support.check_support("good.example"),
            support.check_support("bad.example"),
        );

        assert_eq!(good.unwrap().authoritative_domain().as_str(), "good.example");
        assert!(bad.is_err());
        assert_eq!(rx.try_recv().unwrap().principal.as_str(), "good.example");
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
