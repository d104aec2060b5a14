//! 域名生命周期服务
//!
//! 负责协调域名的完整生命周期：添加、别名管理、DNS 检查，以及删除时的级联清理。

use std::sync::Arc;

use futures::future::try_join_all;

use crate::error::CoreResult;
use crate::types::{
    BatchDeleteFailure, BatchDeleteResult, DeletionPayload, DnsCheckResult, DnsPolicy, Domain,
    DomainAlias, JobKind,
};
use crate::utils::domain_name::canonical;

use super::{DnsVerifier, DomainRegistry, ServiceContext};

/// 域名生命周期服务
pub struct DomainLifecycleService {
    ctx: Arc<ServiceContext>,
    registry: DomainRegistry,
    verifier: DnsVerifier,
}

impl DomainLifecycleService {
    /// 创建域名生命周期服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, policy: Arc<DnsPolicy>) -> Self {
        Self {
            registry: DomainRegistry::new(ctx.clone()),
            verifier: DnsVerifier::new(ctx.clone(), policy),
            ctx,
        }
    }

    /// 获取用户的域名列表，并实时填充 DKIM 状态
    ///
    /// 每个域名和别名各查询一次后端，全部并发执行。
    pub async fn get_domains(&self, user_id: &str) -> CoreResult<Vec<Domain>> {
        let user = self.ctx.load_user(user_id).await?;

        try_join_all(user.domains.into_iter().map(|domain| self.with_dkim_flags(domain))).await
    }

    async fn with_dkim_flags(&self, mut domain: Domain) -> CoreResult<Domain> {
        let (dkim, alias_flags) = futures::try_join!(
            self.ctx.has_dkim(&domain.domain),
            try_join_all(domain.aliases.iter().map(|a| self.ctx.has_dkim(&a.domain))),
        )?;
        domain.dkim = dkim;
        for (alias, flag) in domain.aliases.iter_mut().zip(alias_flags) {
            alias.dkim = flag;
        }
        Ok(domain)
    }

    /// 检查域名（主域名或别名）的 DNS 配置
    pub async fn check_dns(&self, user_id: &str, domain: &str) -> CoreResult<DnsCheckResult> {
        let user = self.ctx.load_user(user_id).await?;
        let domain = canonical(domain);
        self.registry
            .check_if_domain_is_added_to_user(&user, &domain, true)?;
        self.verifier.check(&domain).await
    }

    /// 添加主域名
    pub async fn add_domain(&self, user_id: &str, domain: &str) -> CoreResult<Domain> {
        let mut user = self.ctx.load_user(user_id).await?;
        self.registry.add_domain(&mut user, domain).await
    }

    /// 添加域名别名
    pub async fn add_alias(
        &self,
        user_id: &str,
        domain: &str,
        alias: &str,
    ) -> CoreResult<DomainAlias> {
        let mut user = self.ctx.load_user(user_id).await?;
        self.registry.add_alias(&mut user, domain, alias).await
    }

    /// 删除域名别名
    pub async fn delete_alias(&self, user_id: &str, domain: &str, alias: &str) -> CoreResult<()> {
        let mut user = self.ctx.load_user(user_id).await?;
        self.registry.delete_alias(&mut user, domain, alias).await
    }

    /// 删除域名
    ///
    /// 流程：校验归属 -> 删除 DKIM -> 入队三个级联删除任务 -> 本地移除
    /// 返回已入队的任务 ID。
    pub async fn delete_domain(&self, user_id: &str, domain: &str) -> CoreResult<Vec<String>> {
        let mut user = self.ctx.load_user(user_id).await?;
        let domain = canonical(domain);
        self.registry
            .check_if_domain_is_added_to_user(&user, &domain, false)?;

        self.ctx.delete_dkim_if_present(&domain).await?;

        let mut job_ids = Vec::with_capacity(JobKind::ALL.len());
        for kind in JobKind::ALL {
            let id = self
                .ctx
                .job_queue
                .enqueue(kind, DeletionPayload::new(user.id.clone(), domain.clone()))
                .await?;
            job_ids.push(id);
        }

        self.registry.remove_domain(&mut user, &domain).await?;
        log::info!(
            "Domain {domain} removed from user {}, {} cleanup job(s) queued",
            user.id,
            job_ids.len()
        );
        Ok(job_ids)
    }

    /// 删除用户的全部域名
    ///
    /// 各域名独立删除，单个失败只记录，不影响其他域名。
    pub async fn delete_all_domains(&self, user_id: &str) -> CoreResult<BatchDeleteResult> {
        let user = self.ctx.load_user(user_id).await?;

        let mut success_count = 0;
        let mut failures = Vec::new();

        for domain in user.domains {
            match self.delete_domain(user_id, &domain.domain).await {
                Ok(_) => success_count += 1,
                Err(e) => {
                    if e.is_expected() {
                        log::warn!("Failed to delete domain {}: {e}", domain.domain);
                    } else {
                        log::error!("Failed to delete domain {}: {e}", domain.domain);
                    }
                    failures.push(BatchDeleteFailure {
                        domain: domain.domain,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(BatchDeleteResult {
            success_count,
            failed_count: failures.len(),
            failures,
        })
    }
}
