//! `MailBackend` trait implementation

use async_trait::async_trait;
use urlencoding::encode;

use crate::error::Result;
use crate::traits::{ErrorContext, MailBackend, ResourceKind};
use crate::types::{
    BackendAccount, BackendDomainAlias, BackendForwarder, CreateDomainAliasRequest, DkimKey, Empty,
    IdPayload,
};

use super::MailBackendClient;

#[async_trait]
impl MailBackend for MailBackendClient {
    async fn list_accounts(&self, domain: &str) -> Result<Vec<BackendAccount>> {
        let ctx = ErrorContext::new(ResourceKind::User, domain);
        self.get_all_pages(
            "/users",
            &[("tags", domain.to_string()), ("requiredTags", domain.to_string())],
            &ctx,
        )
        .await
    }

    async fn delete_account(&self, id: &str) -> Result<()> {
        let ctx = ErrorContext::new(ResourceKind::User, id);
        let _: Empty = self.delete(&format!("/users/{}", encode(id)), &ctx).await?;
        Ok(())
    }

    async fn list_forwarders(&self, domain: &str) -> Result<Vec<BackendForwarder>> {
        let ctx = ErrorContext::new(ResourceKind::Address, domain);
        self.get_all_pages(
            "/addresses",
            &[("query", format!("@{domain}")), ("forward", "true".to_string())],
            &ctx,
        )
        .await
    }

    async fn delete_forwarder(&self, id: &str) -> Result<()> {
        let ctx = ErrorContext::new(ResourceKind::Address, id);
        let _: Empty = self
            .delete(&format!("/addresses/forwarded/{}", encode(id)), &ctx)
            .await?;
        Ok(())
    }

    async fn list_domain_aliases(&self, domain: &str) -> Result<Vec<BackendDomainAlias>> {
        let ctx = ErrorContext::new(ResourceKind::DomainAlias, domain);
        let aliases: Vec<BackendDomainAlias> = self
            .get_all_pages("/domainaliases", &[("query", domain.to_string())], &ctx)
            .await?;

        // `query` is a fuzzy match, keep only aliases targeting this domain
        Ok(aliases
            .into_iter()
            .filter(|a| a.domain.eq_ignore_ascii_case(domain))
            .collect())
    }

    async fn create_domain_alias(&self, alias: &str, domain: &str) -> Result<String> {
        let ctx = ErrorContext::new(ResourceKind::DomainAlias, alias);
        let created: IdPayload = self
            .post(
                "/domainaliases",
                &CreateDomainAliasRequest { alias, domain },
                &ctx,
            )
            .await?;
        log::info!("[backend] Domain alias {alias} -> {domain} created ({})", created.id);
        Ok(created.id)
    }

    async fn resolve_domain_alias(&self, alias: &str) -> Result<String> {
        let ctx = ErrorContext::new(ResourceKind::DomainAlias, alias);
        let resolved: IdPayload = self
            .get(&format!("/domainaliases/resolve/{}", encode(alias)), &[], &ctx)
            .await?;
        Ok(resolved.id)
    }

    async fn delete_domain_alias(&self, id: &str) -> Result<()> {
        let ctx = ErrorContext::new(ResourceKind::DomainAlias, id);
        let _: Empty = self
            .delete(&format!("/domainaliases/{}", encode(id)), &ctx)
            .await?;
        Ok(())
    }

    async fn resolve_dkim(&self, domain: &str) -> Result<String> {
        let ctx = ErrorContext::new(ResourceKind::Dkim, domain);
        let resolved: IdPayload = self
            .get(&format!("/dkim/resolve/{}", encode(domain)), &[], &ctx)
            .await?;
        Ok(resolved.id)
    }

    async fn get_dkim(&self, id: &str) -> Result<DkimKey> {
        let ctx = ErrorContext::new(ResourceKind::Dkim, id);
        self.get(&format!("/dkim/{}", encode(id)), &[], &ctx).await
    }

    async fn delete_dkim(&self, id: &str) -> Result<()> {
        let ctx = ErrorContext::new(ResourceKind::Dkim, id);
        let _: Empty = self.delete(&format!("/dkim/{}", encode(id)), &ctx).await?;
        Ok(())
    }
}
