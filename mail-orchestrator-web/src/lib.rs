//! Actix-web surface of Mail Orchestrator.
//!
//! `main.rs` wires [`config::Config`] into an [`AppState`](mail_orchestrator_app::AppState)
//! via [`build_state`] and serves [`routes::configure`].

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

use std::sync::Arc;

use anyhow::Context;
use mail_orchestrator_app::adapters::SqliteStore;
use mail_orchestrator_app::{AppState, AppStateBuilder};
use mail_orchestrator_backend::MailBackendClient;
use mail_orchestrator_core::dns::HickoryDnsResolver;
use mail_orchestrator_core::traits::DnsResolver;

use crate::config::Config;

/// Build the application state from configuration.
///
/// Opens the SQLite store (which holds both users and jobs), the backend
/// client and the DNS resolver. The queue is not started.
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store = Arc::new(
        SqliteStore::new(&config.database.path)
            .await
            .context("failed to open database")?,
    );
    let backend = MailBackendClient::new(config.backend.to_backend_config())
        .context("failed to create backend client")?;
    let resolver: Arc<dyn DnsResolver> = if config.dns.nameservers.is_empty() {
        Arc::new(HickoryDnsResolver::from_system_conf())
    } else {
        Arc::new(HickoryDnsResolver::with_nameservers(&config.dns.nameservers))
    };

    let state = AppStateBuilder::new()
        .user_repository(store.clone())
        .job_store(store)
        .backend(Arc::new(backend))
        .resolver(resolver)
        .dns_policy(config.dns.to_policy()?)
        .retry_policy(config.queue.retry_policy())
        .queue_workers(config.queue.workers)
        .build()?;
    Ok(state)
}
