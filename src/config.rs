//! Resolver options and their environment overrides.

use std::collections::HashMap;
use std::time::Duration;

use url::Url;

use crate::error::ResolutionError;

/// Upper bound on the delegation chain length, principal included
pub const MAX_AUTHORITY_DELEGATIONS: usize = 6;

/// Budget for one well-known request to produce response headers
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const TIMEOUT_VAR: &str = "BROWSERID_PRIMARY_TIMEOUT_MS";
const SHIMS_VAR: &str = "SHIMMED_PRIMARIES";

/// Options for primary support resolution
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Per-hop request timeout
    pub timeout: Duration,

    /// Domains whose well-known document is served from another origin
    ///
    /// Used to point production domain names at local test servers.
    pub shimmed_primaries: HashMap<String, Url>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            shimmed_primaries: HashMap::new(),
        }
    }
}

impl ResolverOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_shim(mut self, domain: impl Into<String>, origin: Url) -> Self {
        self.shimmed_primaries.insert(domain.into(), origin);
        self
    }

    /// Builds options from the process environment
    ///
    /// * `BROWSERID_PRIMARY_TIMEOUT_MS` - per-hop timeout in milliseconds
    /// * `SHIMMED_PRIMARIES` - comma separated `domain|origin` entries
    pub fn from_env() -> Result<Self, ResolutionError> {
        Self::from_vars(
            std::env::var(TIMEOUT_VAR).ok().as_deref(),
            std::env::var(SHIMS_VAR).ok().as_deref(),
        )
    }

    fn from_vars(timeout: Option<&str>, shims: Option<&str>) -> Result<Self, ResolutionError> {
        let mut options = Self::default();

        if let Some(value) = timeout {
            let millis = value.trim().parse::<u64>().map_err(|e| ResolutionError::Config {
                var: TIMEOUT_VAR,
                reason: format!("{value:?}: {e}"),
            })?;
            options.timeout = Duration::from_millis(millis);
        }

        if let Some(value) = shims {
            for entry in value.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                let mut fields = entry.split('|');
                let (domain, origin) = match (fields.next(), fields.next()) {
                    (Some(domain), Some(origin)) if !domain.is_empty() => (domain, origin),
                    _ => {
                        return Err(ResolutionError::Config {
                            var: SHIMS_VAR,
                            reason: format!("expected domain|origin, got {entry:?}"),
                        })
                    }
                };
                let origin = Url::parse(origin).map_err(|e| ResolutionError::Config {
                    var: SHIMS_VAR,
                    reason: format!("{origin:?}: {e}"),
                })?;
                options.shimmed_primaries.insert(domain.to_string(), origin);
            }
        }

        Ok(options)
    }
}
