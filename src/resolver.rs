//! Delegation chain resolution.
//!
//! This module walks the well-known documents from a principal domain to the
//! domain that is authoritative for it. Hops run strictly one after another,
//! the next authority is only known once the current document is parsed.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error};

use crate::config::{ResolverOptions, MAX_AUTHORITY_DELEGATIONS};
use crate::domain::Domain;
use crate::error::{DocumentError, ResolutionError};
use crate::fetch::WellKnownFetcher;
use crate::types::{
    DelegationChain, ResolutionMetadata, ResolutionResult, Support, SupportDocument, SupportUrls,
};
use crate::well_known;

/// Core resolver for primary support
#[derive(Debug, Clone)]
pub struct Resolver {
    /// Fetcher for the per-hop documents
    fetcher: WellKnownFetcher,
}

impl Resolver {
    /// Creates a new Resolver instance
    pub fn new(options: &ResolverOptions) -> Result<Self, ResolutionError> {
        Ok(Self::with_fetcher(WellKnownFetcher::new(options)?))
    }

    pub fn with_fetcher(fetcher: WellKnownFetcher) -> Self {
        Self { fetcher }
    }

    /// Resolves `principal` to its authoritative domain
    ///
    /// Every call starts from a fresh chain; nothing is remembered between
    /// calls.
    ///
    /// # Example
    /// ```no_run
    /// use browserid_primary::{Domain, Resolver, ResolverOptions};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let resolver = Resolver::new(&ResolverOptions::default())?;
    ///     let result = resolver.resolve(&Domain::parse("example.com")?).await?;
    ///     println!("{} is served by {}", result.delegation_chain, result.authoritative_domain());
    ///     Ok(())
    /// }
    /// ```
    pub async fn resolve(&self, principal: &Domain) -> Result<ResolutionResult, ResolutionError> {
        let start_time = Instant::now();

        let mut chain = DelegationChain::new(principal.clone());
        let mut current = principal.clone();
        let mut hops = 0;

        let support = loop {
            let body = self.fetcher.fetch(&current, principal).await?;
            hops += 1;

            let document = well_known::parse(&body).map_err(|source| {
                if let DocumentError::UnknownType(kind) = &source {
                    error!("unhandled support document type {kind:?} from {current}");
                }
                ResolutionError::Parse {
                    domain: current.to_string(),
                    source,
                }
            })?;

            match document {
                SupportDocument::Disabled => break Support::Disabled,
                SupportDocument::Delegation { authority } => {
                    if chain.contains(&authority) {
                        let mut cycle = chain;
                        cycle.push(authority);
                        return Err(ResolutionError::Cycle { chain: cycle });
                    }

                    chain.push(authority.clone());
                    debug!("{current} delegates to {authority}");

                    if chain.len() > MAX_AUTHORITY_DELEGATIONS {
                        return Err(ResolutionError::MaxHops { chain });
                    }

                    current = authority;
                }
                SupportDocument::Supported {
                    public_key,
                    authentication_path,
                    provisioning_path,
                } => {
                    let urls = SupportUrls {
                        auth: current.https_url(&authentication_path)?,
                        prov: current.https_url(&provisioning_path)?,
                    };
                    break Support::Supported {
                        public_key,
                        urls,
                        proxied: false,
                    };
                }
            }
        };

        Ok(ResolutionResult {
            support,
            delegation_chain: chain,
            metadata: ResolutionMetadata {
                retrieved: Utc::now(),
                duration: start_time.elapsed(),
                hops,
            },
        })
    }
}

/// Convenience function for resolving a domain without creating a Resolver instance
pub async fn resolve_domain(domain: &str) -> Result<ResolutionResult, ResolutionError> {
    let principal = Domain::parse(domain)?;
    Resolver::new(&ResolverOptions::default())?
        .resolve(&principal)
        .await
}
