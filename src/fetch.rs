//! Retrieval of well-known support documents.
//!
//! One call issues exactly one GET and completes exactly once. The request has
//! a deadline that covers everything up to the response headers; when it
//! passes, the in-flight request future is dropped, which aborts the request.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect, Client, StatusCode};
use tokio::time;
use tracing::debug;
use url::Url;

use crate::config::ResolverOptions;
use crate::domain::Domain;
use crate::error::{NotAPrimaryReason, ResolutionError};

/// Fetches unparsed support documents
#[derive(Debug, Clone)]
pub struct WellKnownFetcher {
    /// HTTP client for the well-known requests
    client: Client,
    /// Deadline for response headers
    timeout: Duration,
    /// Origins overriding `https://{domain}`
    shimmed_primaries: HashMap<String, Url>,
}

impl WellKnownFetcher {
    pub fn new(options: &ResolverOptions) -> Result<Self, ResolutionError> {
        let mut builder = Client::builder().redirect(redirect::Policy::none());
        // shimmed origins are local servers, reached directly
        if !options.shimmed_primaries.is_empty() {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            timeout: options.timeout,
            shimmed_primaries: options.shimmed_primaries.clone(),
        })
    }

    /// The URL the well-known document of `current` is requested from
    pub fn url_for(&self, current: &Domain, principal: &Domain) -> Result<Url, ResolutionError> {
        match self.shimmed_primaries.get(current.as_str()) {
            Some(origin) => Ok(Domain::well_known_at(origin, principal)),
            None => current.well_known_url(principal),
        }
    }

    /// Fetches the raw support document `current` serves for `principal`
    pub async fn fetch(
        &self,
        current: &Domain,
        principal: &Domain,
    ) -> Result<String, ResolutionError> {
        let url = self.url_for(current, principal)?;
        debug!(%url, domain = %current, "fetching support document");

        let response = match time::timeout(self.timeout, self.client.get(url).send()).await {
            Ok(result) => result.map_err(|source| ResolutionError::Network {
                domain: current.to_string(),
                source,
            })?,
            Err(_) => {
                return Err(ResolutionError::Timeout {
                    domain: current.to_string(),
                    after: self.timeout,
                })
            }
        };

        if response.status() != StatusCode::OK {
            return Err(ResolutionError::NotAPrimary {
                domain: current.to_string(),
                reason: NotAPrimaryReason::Status(response.status().as_u16()),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        if !content_type.is_some_and(|value| value.starts_with("application/json")) {
            return Err(ResolutionError::NotAPrimary {
                domain: current.to_string(),
                reason: NotAPrimaryReason::ContentType(content_type.map(String::from)),
            });
        }

        response.text().await.map_err(|source| ResolutionError::Network {
            domain: current.to_string(),
            source,
        })
    }
}
