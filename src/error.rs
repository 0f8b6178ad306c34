//! Error types for primary support resolution.
//!
//! Every way a resolution can end without a terminal support document is a
//! variant of [`ResolutionError`]. Parser failures are described separately by
//! [`DocumentError`] and tagged with the domain that served the document.

use std::time::Duration;

use thiserror::Error;

use crate::types::DelegationChain;

/// Why a domain was judged not to be a primary before its body was read
#[derive(Debug, Clone, PartialEq)]
pub enum NotAPrimaryReason {
    /// The well-known request answered with something other than 200
    Status(u16),
    /// The response did not carry an `application/json` content type
    ContentType(Option<String>),
}

impl std::fmt::Display for NotAPrimaryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(code) => write!(f, "non-200 response code ({code})"),
            Self::ContentType(_) => f.write_str("non \"application/json\" response"),
        }
    }
}

/// Errors that can occur while resolving primary support for a domain
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// The supplied domain is empty or not a valid host name
    #[error("invalid domain: {0:?}")]
    InvalidDomain(String),

    /// The domain does not take part in the protocol
    #[error("{domain} is not a browserid primary - {reason} to {}", crate::domain::WELL_KNOWN_PATH)]
    NotAPrimary {
        domain: String,
        reason: NotAPrimaryReason,
    },

    /// No response headers arrived within the per-hop budget
    #[error("timeout after {after:?} trying to load well-known for {domain}")]
    Timeout { domain: String, after: Duration },

    /// Transport failure (DNS, refused connection, TLS, reset)
    #[error("{domain} is not a browserid primary: {source}")]
    Network {
        domain: String,
        #[source]
        source: reqwest::Error,
    },

    /// The support document was malformed or incomplete
    #[error("bad support document for '{domain}': {source}")]
    Parse {
        domain: String,
        #[source]
        source: DocumentError,
    },

    /// A delegation pointed back at a domain already in the chain
    #[error("circular reference in delegating authority: {chain}")]
    Cycle { chain: DelegationChain },

    /// The chain grew past the delegation bound
    #[error("too many hops while delegating authority: {chain}")]
    MaxHops { chain: DelegationChain },

    /// An authentication or provisioning URL is malformed or leaves the serving domain
    #[error("invalid URL in support document: {url}")]
    UrlValidation {
        url: String,
        #[source]
        source: Option<url::ParseError>,
    },

    /// The domain resolved, but not to a key
    #[error("can't get public key for {domain}{}", cause_suffix(.source))]
    PublicKeyUnavailable {
        domain: String,
        #[source]
        source: Option<Box<ResolutionError>>,
    },

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// An environment variable held an unusable value
    #[error("invalid configuration in {var}: {reason}")]
    Config { var: &'static str, reason: String },
}

fn cause_suffix(source: &Option<Box<ResolutionError>>) -> String {
    source.as_ref().map(|e| format!(": {e}")).unwrap_or_default()
}

/// Errors raised while interpreting a fetched support document
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The body is not JSON of the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A field the document type requires is absent
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// A delegation document named an empty authority
    #[error("delegation authority is empty")]
    EmptyAuthority,

    /// A delegation document named something that is not a host
    #[error("delegation authority {0:?} is not a valid domain")]
    InvalidAuthority(String),

    /// The `type` discriminator is not one we understand
    #[error("unknown support document type {0:?}")]
    UnknownType(String),
}
