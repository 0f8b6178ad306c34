//! Fake primaries for resolution tests.
//!
//! Every simulated domain gets its own mock server, wired in through
//! shimmed primaries so the production domain names stay in the chain.

use std::collections::HashMap;

use serde_json::{json, Value};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::config::ResolverOptions;
use crate::domain::WELL_KNOWN_PATH;

pub(crate) fn supported() -> Value {
    json!({
        "type": "supported",
        "publicKey": { "algorithm": "RS", "n": "4750", "e": "65537" },
        "paths": { "authentication": "/sign_in", "provisioning": "/provision" }
    })
}

pub(crate) fn delegation(authority: &str) -> Value {
    json!({ "type": "delegation", "authority": authority })
}

pub(crate) fn disabled() -> Value {
    json!({ "type": "disabled" })
}

#[derive(Default)]
pub(crate) struct FakePrimaries {
    servers: HashMap<String, MockServer>,
}

impl FakePrimaries {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    async fn server(&mut self, domain: &str) -> &MockServer {
        if !self.servers.contains_key(domain) {
            let server = MockServer::start().await;
            self.servers.insert(domain.to_string(), server);
        }
        &self.servers[domain]
    }

    /// Serves `document` for `domain` and expects exactly `expected` requests
    pub(crate) async fn serve(
        &mut self,
        domain: &str,
        principal: &str,
        document: Value,
        expected: u64,
    ) {
        let template = ResponseTemplate::new(200).set_body_json(document);
        self.respond(domain, principal, template, expected).await;
    }

    pub(crate) async fn respond(
        &mut self,
        domain: &str,
        principal: &str,
        template: ResponseTemplate,
        expected: u64,
    ) {
        let server = self.server(domain).await;
        Mock::given(method("GET"))
            .and(path(WELL_KNOWN_PATH))
            .and(query_param("domain", principal))
            .respond_with(template)
            .expect(expected)
            .mount(server)
            .await;
    }

    pub(crate) fn options(&self) -> ResolverOptions {
        self.servers
            .iter()
            .fold(ResolverOptions::default(), |options, (domain, server)| {
                let origin = Url::parse(&server.uri()).expect("mock server uri");
                options.with_shim(domain.clone(), origin)
            })
    }
}
