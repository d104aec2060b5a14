use async_trait::async_trait;

use crate::error::{BackendError, Result};
use crate::types::{BackendAccount, BackendDomainAlias, BackendForwarder, DkimKey};

/// Raw API error (internal)
#[derive(Debug, Clone)]
pub(crate) struct RawApiError {
    /// Error code (e.g. `AliasExists`)
    pub code: Option<String>,
    /// Raw error message
    pub message: String,
}

impl RawApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: message.into(),
        }
    }
}

/// Which kind of resource a request addressed.
///
/// Lets a bare HTTP 404 (no `code` in the body) map to the right not-found variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ResourceKind {
    #[default]
    Other,
    User,
    Address,
    DomainAlias,
    Dkim,
}

/// Error context (internal)
#[derive(Debug, Clone, Default)]
pub(crate) struct ErrorContext {
    /// Resource kind the request addressed
    pub resource: ResourceKind,
    /// Resource identifier (id, alias or domain)
    pub subject: Option<String>,
}

impl ErrorContext {
    pub fn new(resource: ResourceKind, subject: impl Into<String>) -> Self {
        Self {
            resource,
            subject: Some(subject.into()),
        }
    }

    pub(crate) fn subject_or_unknown(&self) -> String {
        self.subject
            .clone()
            .unwrap_or_else(|| "<unknown>".to_string())
    }
}

/// Error mapping trait (internal)
/// Maps the backend's raw error codes onto [`BackendError`]
pub(crate) trait ErrorMapper {
    /// Map a raw API error to a [`BackendError`]
    fn map_error(&self, raw: RawApiError, context: &ErrorContext) -> BackendError;

    /// Shortcut: parse error
    fn parse_error(&self, detail: impl ToString) -> BackendError {
        BackendError::ParseError {
            detail: detail.to_string(),
        }
    }

    /// Shortcut: unknown error (fallback)
    fn unknown_error(&self, raw: RawApiError) -> BackendError {
        BackendError::Unknown {
            raw_code: raw.code,
            raw_message: raw.message,
        }
    }
}

/// Mail backend control-plane API.
///
/// Every method is one round trip; nothing is retried here. Not-found conditions
/// come back as the matching [`BackendError`] variant (see
/// [`BackendError::is_not_found`]) so callers decide whether absence matters.
#[async_trait]
pub trait MailBackend: Send + Sync {
    /// List every mail account tagged with `domain`.
    async fn list_accounts(&self, domain: &str) -> Result<Vec<BackendAccount>>;

    /// Delete a mail account.
    async fn delete_account(&self, id: &str) -> Result<()>;

    /// List every forwarded address on `domain`.
    async fn list_forwarders(&self, domain: &str) -> Result<Vec<BackendForwarder>>;

    /// Delete a forwarded address.
    async fn delete_forwarder(&self, id: &str) -> Result<()>;

    /// List every domain alias that points at `domain`.
    async fn list_domain_aliases(&self, domain: &str) -> Result<Vec<BackendDomainAlias>>;

    /// Register `alias` as an alias of `domain`, returning the backend id.
    async fn create_domain_alias(&self, alias: &str, domain: &str) -> Result<String>;

    /// Resolve an alias name to its backend id.
    async fn resolve_domain_alias(&self, alias: &str) -> Result<String>;

    /// Delete a domain alias by id.
    async fn delete_domain_alias(&self, id: &str) -> Result<()>;

    /// Resolve a domain name to the id of its DKIM key.
    async fn resolve_dkim(&self, domain: &str) -> Result<String>;

    /// Fetch a DKIM key by id.
    async fn get_dkim(&self, id: &str) -> Result<DkimKey>;

    /// Delete a DKIM key by id.
    async fn delete_dkim(&self, id: &str) -> Result<()>;

    /// Look up the DKIM key for `domain`, folding `DkimNotFound` into `None`.
    async fn find_dkim(&self, domain: &str) -> Result<Option<DkimKey>> {
        let id = match self.resolve_dkim(domain).await {
            Ok(id) => id,
            Err(BackendError::DkimNotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        match self.get_dkim(&id).await {
            Ok(key) => Ok(Some(key)),
            Err(BackendError::DkimNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
