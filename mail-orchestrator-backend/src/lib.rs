//! # mail-orchestrator-backend
//!
//! Typed client for the mail backend's control-plane HTTP API.
//!
//! ## Resources
//!
//! | Resource | Operations |
//! |----------|------------|
//! | Accounts (`/users`) | list by domain tag, delete |
//! | Forwarders (`/addresses/forwarded`) | list by domain, delete |
//! | Domain aliases (`/domainaliases`) | list, create, resolve, delete |
//! | DKIM keys (`/dkim`) | resolve by domain, get, delete |
//!
//! Every request carries the static access token and a fixed timeout.
//! Responses follow the backend envelope `{success, error?, code?, ...data}`;
//! failures are mapped onto [`BackendError`] so callers match on variants
//! instead of inspecting raw payloads.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mail_orchestrator_backend::{BackendConfig, MailBackend, MailBackendClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = MailBackendClient::new(BackendConfig::new("http://127.0.0.1:8080", "secret"))?;
//!
//!     if let Some(key) = client.find_dkim("example.com").await? {
//!         println!("{} -> {}", key.dns_txt.name, key.dns_txt.value);
//!     }
//!
//!     for account in client.list_accounts("example.com").await? {
//!         println!("{}", account.address);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! - [`BackendError::is_not_found`]: the addressed resource does not exist
//! - [`BackendError::is_transport`]: network failure, timeout or unreadable response
//! - [`BackendError::AliasExists`] / [`BackendError::AddressExists`]: conflicts

mod client;
mod error;
mod http_client;
mod traits;
mod types;
mod utils;

pub use client::{BackendConfig, DEFAULT_REQUEST_TIMEOUT_SECS, MailBackendClient};
pub use error::{BackendError, Result};
pub use traits::MailBackend;
pub use types::{BackendAccount, BackendDomainAlias, BackendForwarder, DkimDnsTxt, DkimKey};
pub use utils::log_sanitizer;
