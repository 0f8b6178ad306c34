//! Parsing of `/.well-known/browserid` support documents.

use serde::Deserialize;

use crate::domain::Domain;
use crate::error::DocumentError;
use crate::types::{PublicKey, SupportDocument};

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "type")]
    kind: Option<String>,

    authority: Option<String>,

    #[serde(rename = "publicKey")]
    public_key: Option<serde_json::Value>,

    paths: Option<RawPaths>,
}

#[derive(Debug, Deserialize)]
struct RawPaths {
    authentication: Option<String>,
    provisioning: Option<String>,
}

/// Parses the raw body of a support document
pub fn parse(body: &str) -> Result<SupportDocument, DocumentError> {
    let raw: RawDocument = serde_json::from_str(body)?;

    match raw.kind.as_deref() {
        Some("disabled") => Ok(SupportDocument::Disabled),
        Some("delegation") => {
            let authority = raw.authority.ok_or(DocumentError::MissingField("authority"))?;
            if authority.is_empty() {
                return Err(DocumentError::EmptyAuthority);
            }
            let authority = Domain::parse(&authority)
                .map_err(|_| DocumentError::InvalidAuthority(authority))?;
            Ok(SupportDocument::Delegation { authority })
        }
        Some("supported") => {
            let public_key = raw
                .public_key
                .filter(|key| !key.is_null())
                .ok_or(DocumentError::MissingField("publicKey"))?;
            let paths = raw.paths.ok_or(DocumentError::MissingField("paths"))?;
            let authentication_path = paths
                .authentication
                .ok_or(DocumentError::MissingField("paths.authentication"))?;
            let provisioning_path = paths
                .provisioning
                .ok_or(DocumentError::MissingField("paths.provisioning"))?;

            Ok(SupportDocument::Supported {
                public_key: PublicKey(public_key),
                authentication_path,
                provisioning_path,
            })
        }
        Some(other) => Err(DocumentError::UnknownType(other.to_string())),
        None => Err(DocumentError::MissingField("type")),
    }
}
