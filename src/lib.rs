//! Discovery of BrowserID primary identity authorities.
//!
//! A domain is a primary when it serves a `/.well-known/browserid` support
//! document over HTTPS. The document either disables support, delegates it to
//! another domain, or advertises a public key and the authentication and
//! provisioning pages. This library follows delegations until it reaches one
//! of the terminal states, guarding against cycles and overly long chains.

mod config;
mod domain;
mod error;
mod events;
mod fetch;
mod primary;
mod resolver;
mod types;
mod well_known;

#[cfg(test)]
mod test_support;

pub use config::{ResolverOptions, DEFAULT_TIMEOUT, MAX_AUTHORITY_DELEGATIONS};
pub use domain::{domain_of_email, Domain, WELL_KNOWN_PATH};
pub use error::{DocumentError, NotAPrimaryReason, ResolutionError};
pub use events::{DiscoveryEvent, DiscoveryEvents};
pub use fetch::WellKnownFetcher;
pub use primary::PrimarySupport;
pub use resolver::{resolve_domain, Resolver};
pub use types::{
    DelegationChain,
    PublicKey,
    ResolutionMetadata,
    ResolutionResult,
    Support,
    SupportDocument,
    SupportUrls,
};
pub use well_known::parse as parse_support_document;

/// Checks primary support for a domain with default options
///
/// Discovery events are not observable through this function; use
/// [`PrimarySupport`] to subscribe to them.
///
/// # Example
/// ```no_run
/// use browserid_primary::check_support;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let result = check_support("example.com").await?;
///
///     println!("Authoritative domain: {}", result.authoritative_domain());
///     Ok(())
/// }
/// ```
pub async fn check_support(domain: &str) -> Result<ResolutionResult, ResolutionError> {
    PrimarySupport::new(&ResolverOptions::default(), DiscoveryEvents::default())?
        .check_support(domain)
        .await
}
