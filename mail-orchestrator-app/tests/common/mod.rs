#![allow(dead_code, clippy::unwrap_used)]
//! Shared fakes for the app integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mail_orchestrator_backend::{
    BackendAccount, BackendDomainAlias, BackendError, BackendForwarder, DkimKey, MailBackend,
};
use mail_orchestrator_core::error::CoreResult;
use mail_orchestrator_core::traits::{DnsAnswer, DnsResolver, TxtRecord};
use mail_orchestrator_core::types::{DnsPolicy, MxRecord};

/// Backend holding accounts per domain; everything else is empty.
#[derive(Default)]
pub struct FakeBackend {
    accounts: Mutex<HashMap<String, Vec<BackendAccount>>>,
    deleted: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_accounts(domain: &str, count: usize) -> Arc<Self> {
        let backend = Self::default();
        let accounts = (0..count)
            .map(|i| BackendAccount {
                id: format!("{domain}-acc-{i}"),
                username: format!("user{i}"),
                address: format!("user{i}@{domain}"),
                tags: vec![domain.to_string()],
            })
            .collect();
        backend
            .accounts
            .lock()
            .unwrap()
            .insert(domain.to_string(), accounts);
        Arc::new(backend)
    }

    pub fn remaining_accounts(&self, domain: &str) -> usize {
        self.accounts
            .lock()
            .unwrap()
            .get(domain)
            .map_or(0, Vec::len)
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailBackend for FakeBackend {
    async fn list_accounts(&self, domain: &str) -> Result<Vec<BackendAccount>, BackendError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_account(&self, id: &str) -> Result<(), BackendError> {
        for accounts in self.accounts.lock().unwrap().values_mut() {
            accounts.retain(|a| a.id != id);
        }
        self.deleted.lock().unwrap().push(id.to_string());
        Ok(())
    }

    async fn list_forwarders(&self, _domain: &str) -> Result<Vec<BackendForwarder>, BackendError> {
        Ok(Vec::new())
    }

    async fn delete_forwarder(&self, _id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn list_domain_aliases(
        &self,
        _domain: &str,
    ) -> Result<Vec<BackendDomainAlias>, BackendError> {
        Ok(Vec::new())
    }

    async fn create_domain_alias(&self, alias: &str, _domain: &str) -> Result<String, BackendError> {
        Ok(format!("alias-{alias}"))
    }

    async fn resolve_domain_alias(&self, alias: &str) -> Result<String, BackendError> {
        Err(BackendError::AliasNotFound {
            alias: alias.to_string(),
            raw_message: None,
        })
    }

    async fn delete_domain_alias(&self, _id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn resolve_dkim(&self, domain: &str) -> Result<String, BackendError> {
        Err(BackendError::DkimNotFound {
            domain: domain.to_string(),
            raw_message: None,
        })
    }

    async fn get_dkim(&self, id: &str) -> Result<DkimKey, BackendError> {
        Err(BackendError::DkimNotFound {
            domain: id.to_string(),
            raw_message: None,
        })
    }

    async fn delete_dkim(&self, _id: &str) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Resolver that finds nothing.
pub struct EmptyResolver;

#[async_trait]
impl DnsResolver for EmptyResolver {
    async fn resolve_ns(&self, _name: &str) -> CoreResult<DnsAnswer<String>> {
        Ok(DnsAnswer::Empty)
    }

    async fn resolve_mx(&self, _name: &str) -> CoreResult<DnsAnswer<MxRecord>> {
        Ok(DnsAnswer::Empty)
    }

    async fn resolve_txt(&self, _name: &str) -> CoreResult<DnsAnswer<TxtRecord>> {
        Ok(DnsAnswer::Empty)
    }
}

pub fn test_policy() -> DnsPolicy {
    DnsPolicy::new(
        vec![MxRecord::new("mx1.mail.example", 10)],
        "v=spf1 include:_spf.mail.example -all",
        Some(r"\+all"),
    )
    .unwrap()
}
