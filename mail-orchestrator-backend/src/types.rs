//! Wire and domain types exchanged with the mail backend.

use serde::{Deserialize, Serialize};

/// Response envelope: `{success, error?, code?, ...data}`
///
/// The payload fields live next to the status flags, so `data` is flattened.
#[derive(Debug, Deserialize)]
pub(crate) struct BackendEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    /// Human-readable error message (the backend names it `error`).
    #[serde(default)]
    pub error: Option<String>,
    /// Machine-readable error code.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(flatten)]
    pub data: Option<T>,
}

/// One page of a cursor-paged listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CursorPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Cursor of the next page; the backend sends `false` on the last page
    #[serde(default)]
    pub next_cursor: Option<serde_json::Value>,
}

impl<T> CursorPage<T> {
    /// Cursor for the following page, if there is one.
    pub fn next(&self) -> Option<String> {
        match &self.next_cursor {
            Some(serde_json::Value::String(c)) if !c.is_empty() => Some(c.clone()),
            _ => None,
        }
    }
}

/// Payload without fields of interest (`delete` responses).
#[derive(Debug, Deserialize)]
pub(crate) struct Empty {}

/// Payload that only carries an id (`create`/`resolve` responses).
#[derive(Debug, Deserialize)]
pub(crate) struct IdPayload {
    pub id: String,
}

/// Mail account (backend "user") tagged with a customer domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendAccount {
    /// Backend id
    pub id: String,
    /// Login name
    #[serde(default)]
    pub username: String,
    /// Primary address
    #[serde(default)]
    pub address: String,
    /// Tags (the owning domain is one of them)
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Forwarded address on a customer domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendForwarder {
    /// Backend id
    pub id: String,
    /// Forwarded address (`name@domain`)
    pub address: String,
    /// Forwarding targets
    #[serde(default)]
    pub targets: Vec<String>,
}

/// Domain alias registered on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDomainAlias {
    /// Backend id
    pub id: String,
    /// Alias domain
    pub alias: String,
    /// Target domain
    pub domain: String,
}

/// TXT record the backend expects to be published for a DKIM key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DkimDnsTxt {
    /// Record name (`<selector>._domainkey.<domain>`)
    pub name: String,
    /// Record value (`v=DKIM1; k=rsa; p=...`)
    pub value: String,
}

/// DKIM signing key stored on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkimKey {
    /// Backend id
    pub id: String,
    /// Signed domain
    pub domain: String,
    /// Selector
    pub selector: String,
    /// Expected DNS record
    pub dns_txt: DkimDnsTxt,
}

/// Request body for `POST /domainaliases`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateDomainAliasRequest<'a> {
    pub alias: &'a str,
    pub domain: &'a str,
}
