//! Domain parsing and URL construction.
//!
//! This module validates the host names that take part in a resolution and
//! turns them into the HTTPS URLs that are fetched or advertised.

use std::fmt;

use url::{Host, Url};

use crate::error::ResolutionError;

/// Path of the support document every primary serves
pub const WELL_KNOWN_PATH: &str = "/.well-known/browserid";

/// A DNS host taking part in a resolution, either as principal or authority
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain(String);

impl Domain {
    /// Parses and validates a domain
    ///
    /// The spelling is kept as given so that authority comparisons are exact.
    pub fn parse(domain: &str) -> Result<Self, ResolutionError> {
        if domain.is_empty() {
            return Err(ResolutionError::InvalidDomain(domain.to_string()));
        }
        Host::parse(domain).map_err(|_| ResolutionError::InvalidDomain(domain.to_string()))?;
        Ok(Self(domain.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The well-known URL of this domain, asked on behalf of `principal`
    pub fn well_known_url(&self, principal: &Domain) -> Result<Url, ResolutionError> {
        let base = Url::parse(&format!("https://{}", self.0))
            .map_err(|_| ResolutionError::InvalidDomain(self.0.clone()))?;
        Ok(Self::well_known_at(&base, principal))
    }

    /// The well-known URL served from an explicit origin
    pub(crate) fn well_known_at(origin: &Url, principal: &Domain) -> Url {
        let mut url = origin.clone();
        url.set_path(WELL_KNOWN_PATH);
        url.query_pairs_mut().clear().append_pair("domain", principal.as_str());
        url
    }

    /// An absolute HTTPS URL on this domain for an advertised path
    ///
    /// The path may not move the URL to another origin or add credentials.
    pub fn https_url(&self, path: &str) -> Result<Url, ResolutionError> {
        let url = format!("https://{}{}", self.0, path);
        let parsed = match Url::parse(&url) {
            Ok(parsed) => parsed,
            Err(source) => {
                return Err(ResolutionError::UrlValidation {
                    url,
                    source: Some(source),
                })
            }
        };

        let origin = Url::parse(&format!("https://{}", self.0))
            .map_err(|_| ResolutionError::InvalidDomain(self.0.clone()))?;
        if parsed.origin() != origin.origin()
            || !parsed.username().is_empty()
            || parsed.password().is_some()
        {
            return Err(ResolutionError::UrlValidation { url, source: None });
        }

        Ok(parsed)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extracts the domain of an email address (everything after the first `@`)
pub fn domain_of_email(email: &str) -> Result<Domain, ResolutionError> {
    let (_, domain) = email
        .split_once('@')
        .ok_or_else(|| ResolutionError::InvalidDomain(email.to_string()))?;
    Domain::parse(domain)
}
