//! Core types for primary support resolution.
//!
//! This module provides the parsed support documents and the result of a
//! completed delegation walk.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::Domain;

/// Opaque signing key advertised by a primary
///
/// The key is passed through exactly as served; only its presence matters here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(pub serde_json::Value);

/// One parsed `/.well-known/browserid` document
#[derive(Debug, Clone, PartialEq)]
pub enum SupportDocument {
    /// The domain explicitly opts out
    Disabled,
    /// Resolution continues at `authority`
    Delegation { authority: Domain },
    /// The domain is authoritative
    Supported {
        public_key: PublicKey,
        authentication_path: String,
        provisioning_path: String,
    },
}

/// Ordered list of the domains visited during a resolution
///
/// Always starts with the principal, so it is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct DelegationChain(Vec<Domain>);

impl DelegationChain {
    pub(crate) fn new(principal: Domain) -> Self {
        Self(vec![principal])
    }

    pub(crate) fn push(&mut self, authority: Domain) {
        self.0.push(authority);
    }

    pub fn contains(&self, domain: &Domain) -> bool {
        self.0.contains(domain)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn principal(&self) -> &Domain {
        &self.0[0]
    }

    /// The last domain of the chain
    pub fn authoritative(&self) -> &Domain {
        &self.0[self.0.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Domain> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Domain] {
        &self.0
    }
}

impl fmt::Display for DelegationChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, domain) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" > ")?;
            }
            f.write_str(domain.as_str())?;
        }
        Ok(())
    }
}

/// Absolute endpoints advertised by an authoritative domain
#[derive(Debug, Clone, PartialEq)]
pub struct SupportUrls {
    /// Authentication page
    pub auth: Url,
    /// Provisioning page
    pub prov: Url,
}

/// Terminal state of a resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Support {
    /// The authoritative domain has disabled support
    Disabled,
    /// The authoritative domain supports the protocol
    Supported {
        public_key: PublicKey,
        urls: SupportUrls,
        /// Reserved, never set
        proxied: bool,
    },
}

/// Resolution result containing the terminal state and the chain that led to it
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// What the authoritative domain declared
    pub support: Support,

    /// Every domain visited, principal first
    pub delegation_chain: DelegationChain,

    /// Metadata about the resolution process
    pub metadata: ResolutionMetadata,
}

impl ResolutionResult {
    pub fn authoritative_domain(&self) -> &Domain {
        self.delegation_chain.authoritative()
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.support, Support::Disabled)
    }

    pub fn public_key(&self) -> Option<&PublicKey> {
        match &self.support {
            Support::Supported { public_key, .. } => Some(public_key),
            Support::Disabled => None,
        }
    }

    pub fn urls(&self) -> Option<&SupportUrls> {
        match &self.support {
            Support::Supported { urls, .. } => Some(urls),
            Support::Disabled => None,
        }
    }
}

/// Metadata about the resolution process
#[derive(Debug, Clone)]
pub struct ResolutionMetadata {
    /// When the terminal document was retrieved
    pub retrieved: DateTime<Utc>,

    /// How long the whole walk took
    pub duration: std::time::Duration,

    /// Number of well-known documents fetched
    pub hops: usize,
}
