//! HTTP implementation of [`MailBackend`](crate::MailBackend)

mod backend;
mod error;
mod http;

use std::time::Duration;

use reqwest::Client;

use crate::error::{BackendError, Result};
use crate::utils::log_sanitizer::mask_secret;

/// Header carrying the static access token.
pub(crate) const ACCESS_TOKEN_HEADER: &str = "X-Access-Token";
/// Page size used for cursor-paged listings.
pub(crate) const PAGE_LIMIT: u32 = 250;
/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
/// Default connect timeout (seconds)
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Connection settings for the mail backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `http://127.0.0.1:8080`
    pub base_url: String,
    /// Static access token sent with every request
    pub access_token: String,
    /// Whole-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Mail backend HTTP client
pub struct MailBackendClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) access_token: String,
}

impl MailBackendClient {
    /// Build a client with the configured timeouts.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS).min(config.timeout))
            .timeout(config.timeout)
            .build()
            .map_err(|e| BackendError::NetworkError {
                detail: format!("Failed to create HTTP client: {e}"),
            })?;

        log::info!(
            "Mail backend client for {} (token {}, timeout {:?})",
            config.base_url,
            mask_secret(&config.access_token),
            config.timeout
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}
