//! 域名注册表服务
//!
//! 维护域名与别名的全局唯一性：一个域名字符串在整个系统中最多属于一个用户，
//! 无论是作为主域名还是别名。

use std::sync::Arc;

use mail_orchestrator_backend::BackendError;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::types::{Domain, DomainAlias, User};
use crate::utils::domain_name::{canonical, normalize_domain};

/// 域名注册表服务
pub struct DomainRegistry {
    ctx: Arc<ServiceContext>,
}

impl DomainRegistry {
    /// 创建域名注册表实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>) -> Self {
        Self { ctx }
    }

    /// 域名是否已被任意用户占用（主域名或别名）
    pub async fn domain_exists(&self, domain: &str) -> CoreResult<bool> {
        let count = self
            .ctx
            .user_repository
            .count_by_domain(&canonical(domain))
            .await?;
        Ok(count > 0)
    }

    /// 检查域名是否可被 `user` 添加
    ///
    /// - `DomainExists`: 已在该用户名下
    /// - `DomainClaimed`: 已被其他用户占用
    pub async fn check_if_domain_already_exists(&self, user: &User, domain: &str) -> CoreResult<()> {
        if user.owns(domain) {
            return Err(CoreError::DomainExists(canonical(domain)));
        }
        if self.domain_exists(domain).await? {
            return Err(CoreError::DomainClaimed(canonical(domain)));
        }
        Ok(())
    }

    /// 检查域名是否属于 `user`
    ///
    /// `include_aliases` 为 `false` 时只接受主域名。
    pub fn check_if_domain_is_added_to_user(
        &self,
        user: &User,
        domain: &str,
        include_aliases: bool,
    ) -> CoreResult<()> {
        let found = if include_aliases {
            user.owns(domain)
        } else {
            user.has_domain(domain)
        };
        if found {
            Ok(())
        } else {
            Err(CoreError::DomainNotFound(canonical(domain)))
        }
    }

    /// 添加主域名
    pub async fn add_domain(&self, user: &mut User, domain: &str) -> CoreResult<Domain> {
        let domain = normalize_domain(domain)?;
        self.check_if_domain_already_exists(user, &domain).await?;

        let added = Domain::new(domain);
        user.domains.push(added.clone());
        self.ctx.user_repository.save(user).await?;

        log::info!("Domain {} added to user {}", added.domain, user.id);
        Ok(added)
    }

    /// 添加域名别名
    ///
    /// 流程：校验主域名归属 -> 校验别名全局可用 -> 后端注册 -> 本地保存
    pub async fn add_alias(
        &self,
        user: &mut User,
        domain: &str,
        alias: &str,
    ) -> CoreResult<DomainAlias> {
        let domain = canonical(domain);
        self.check_if_domain_is_added_to_user(user, &domain, false)?;

        let alias = normalize_domain(alias)?;
        self.check_if_domain_already_exists(user, &alias).await?;

        let id = match self.ctx.backend.create_domain_alias(&alias, &domain).await {
            Ok(id) => id,
            Err(BackendError::AliasExists { .. }) => return Err(CoreError::AliasExists(alias)),
            Err(e) => return Err(e.into()),
        };

        let added = DomainAlias::new(alias);
        user.find_domain_mut(&domain)
            .ok_or_else(|| CoreError::DomainNotFound(domain.clone()))?
            .aliases
            .push(added.clone());

        if let Err(e) = self.ctx.user_repository.save(user).await {
            // 本地保存失败：撤销内存中的修改并尽力删除后端别名
            if let Some(owner) = user.find_domain_mut(&domain) {
                owner.aliases.retain(|a| a.domain != added.domain);
            }
            if let Err(cleanup) = self.ctx.backend.delete_domain_alias(&id).await {
                log::error!(
                    "Failed to roll back backend alias {} ({id}): {cleanup}",
                    added.domain
                );
            }
            return Err(e);
        }

        log::info!(
            "Alias {} ({id}) added to domain {domain} of user {}",
            added.domain,
            user.id
        );
        Ok(added)
    }

    /// 删除域名别名
    ///
    /// 后端资源已不存在时视为成功；其他后端错误直接返回。
    pub async fn delete_alias(&self, user: &mut User, domain: &str, alias: &str) -> CoreResult<()> {
        let domain = canonical(domain);
        let alias = canonical(alias);
        self.check_if_domain_is_added_to_user(user, &domain, false)?;

        let parent = user
            .find_domain_mut(&domain)
            .ok_or_else(|| CoreError::DomainNotFound(domain.clone()))?;
        let Some(index) = parent
            .aliases
            .iter()
            .position(|a| canonical(&a.domain) == alias)
        else {
            return Err(CoreError::DomainNotFound(alias));
        };

        self.delete_backend_alias(&alias).await?;
        self.ctx.delete_dkim_if_present(&alias).await?;

        parent.aliases.remove(index);
        self.ctx.user_repository.save(user).await?;

        log::info!("Alias {alias} removed from domain {domain} of user {}", user.id);
        Ok(())
    }

    /// 从本地移除主域名（含其别名）并保存
    pub async fn remove_domain(&self, user: &mut User, domain: &str) -> CoreResult<Domain> {
        let removed = user
            .remove_domain(domain)
            .ok_or_else(|| CoreError::DomainNotFound(canonical(domain)))?;
        self.ctx.user_repository.save(user).await?;
        Ok(removed)
    }

    async fn delete_backend_alias(&self, alias: &str) -> CoreResult<()> {
        let id = match self.ctx.backend.resolve_domain_alias(alias).await {
            Ok(id) => id,
            Err(e) if e.is_not_found() => {
                log::debug!("Alias {alias} already gone from backend");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        match self.ctx.backend.delete_domain_alias(&id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::{
        create_test_context, user_with_domains, RejectingUserRepository, TestContext,
    };
    use crate::traits::UserRepository;

    fn registry(t: &TestContext) -> DomainRegistry {
        DomainRegistry::new(t.ctx.clone())
    }

    #[tokio::test]
    async fn claimed_by_other_user_and_exists_for_owner() {
        let t = create_test_context();
        let mut u1 = user_with_domains("u1", &[("example.com", &["example.net"])]);
        t.users.save(&u1).await.unwrap();
        let mut u2 = User::new("u2");
        t.users.save(&u2).await.unwrap();
        let reg = registry(&t);

        for name in ["example.com", "example.net"] {
            assert!(matches!(
                reg.add_domain(&mut u2, name).await,
                Err(CoreError::DomainClaimed(_))
            ));
            assert!(matches!(
                reg.add_domain(&mut u1, name).await,
                Err(CoreError::DomainExists(_))
            ));
        }
    }

    #[tokio::test]
    async fn add_domain_normalizes_and_persists() {
        let t = create_test_context();
        let mut user = User::new("u1");
        let reg = registry(&t);

        let added = reg.add_domain(&mut user, "Example.COM.").await.unwrap();
        assert_eq!(added.domain, "example.com");
        assert!(added.admin);

        let stored = t.users.find_by_id("u1").await.unwrap().unwrap();
        assert_eq!(stored.domains.len(), 1);
        assert!(reg.domain_exists("example.com").await.unwrap());
    }

    #[tokio::test]
    async fn add_domain_rejects_invalid_name() {
        let t = create_test_context();
        let mut user = User::new("u1");
        let err = registry(&t)
            .add_domain(&mut user, "not a domain")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert!(t.users.find_by_id("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn alias_is_not_a_primary_domain() {
        let t = create_test_context();
        let user = user_with_domains("u1", &[("example.com", &["example.net"])]);
        let reg = registry(&t);

        assert!(matches!(
            reg.check_if_domain_is_added_to_user(&user, "example.net", false),
            Err(CoreError::DomainNotFound(_))
        ));
        assert!(reg
            .check_if_domain_is_added_to_user(&user, "example.net", true)
            .is_ok());
        assert!(matches!(
            reg.check_if_domain_is_added_to_user(&user, "example.org", true),
            Err(CoreError::DomainNotFound(_))
        ));
    }

    #[tokio::test]
    async fn add_alias_registers_with_backend() {
        let t = create_test_context();
        let mut user = user_with_domains("u1", &[("example.com", &[])]);
        t.users.save(&user).await.unwrap();

        let alias = registry(&t)
            .add_alias(&mut user, "example.com", "example.net")
            .await
            .unwrap();
        assert_eq!(alias.domain, "example.net");
        assert_eq!(
            t.backend.alias_target("example.net").await.as_deref(),
            Some("example.com")
        );
        let stored = t.users.find_by_id("u1").await.unwrap().unwrap();
        assert!(stored.has_alias("example.net"));
    }

    #[tokio::test]
    async fn add_alias_maps_backend_conflict() {
        let t = create_test_context();
        t.backend.add_alias("x1", "example.net", "elsewhere.com").await;
        let mut user = user_with_domains("u1", &[("example.com", &[])]);

        let err = registry(&t)
            .add_alias(&mut user, "example.com", "example.net")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AliasExists(ref a) if a == "example.net"));
        assert!(!user.has_alias("example.net"));
    }

    #[tokio::test]
    async fn add_alias_requires_primary_domain() {
        let t = create_test_context();
        let mut user = user_with_domains("u1", &[("example.com", &["example.net"])]);

        let err = registry(&t)
            .add_alias(&mut user, "example.net", "example.org")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DomainNotFound(_)));
        assert_eq!(t.backend.call_count("create_domain_alias").await, 0);
    }

    #[tokio::test]
    async fn add_alias_transport_failure_is_internal() {
        let t = create_test_context();
        t.backend
            .fail_on(
                "create_domain_alias",
                BackendError::NetworkError {
                    detail: "connection refused".into(),
                },
            )
            .await;
        let mut user = user_with_domains("u1", &[("example.com", &[])]);

        let err = registry(&t)
            .add_alias(&mut user, "example.com", "example.net")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Backend(BackendError::NetworkError { .. })));
        assert_eq!(err.code(), "InternalError");
    }

    #[tokio::test]
    async fn add_alias_rolls_back_backend_alias_when_save_fails() {
        let t = create_test_context();
        let ctx = Arc::new(ServiceContext::new(
            Arc::new(RejectingUserRepository),
            t.backend.clone(),
            t.resolver.clone(),
            t.queue.clone(),
        ));
        let mut user = user_with_domains("u1", &[("example.com", &[])]);

        let err = DomainRegistry::new(ctx)
            .add_alias(&mut user, "example.com", "example.net")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::StorageError(_)));
        assert_eq!(t.backend.call_count("create_domain_alias").await, 1);
        assert_eq!(t.backend.call_count("delete_domain_alias").await, 1);
        assert!(t.backend.alias_target("example.net").await.is_none());
        assert!(user.domains[0].aliases.is_empty());
    }

    #[tokio::test]
    async fn add_alias_keeps_storage_error_when_rollback_fails() {
        let t = create_test_context();
        t.backend
            .fail_on(
                "delete_domain_alias",
                BackendError::NetworkError {
                    detail: "connection reset".into(),
                },
            )
            .await;
        let ctx = Arc::new(ServiceContext::new(
            Arc::new(RejectingUserRepository),
            t.backend.clone(),
            t.resolver.clone(),
            t.queue.clone(),
        ));
        let mut user = user_with_domains("u1", &[("example.com", &[])]);

        let err = DomainRegistry::new(ctx)
            .add_alias(&mut user, "example.com", "example.net")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::StorageError(_)));
        assert_eq!(
            t.backend.alias_target("example.net").await.as_deref(),
            Some("example.com")
        );
    }

    #[tokio::test]
    async fn delete_alias_removes_backend_alias_and_dkim() {
        let t = create_test_context();
        t.backend.add_alias("a1", "example.net", "example.com").await;
        t.backend.add_dkim("k1", "example.net", "mail", "v=DKIM1; p=abc").await;
        let mut user = user_with_domains("u1", &[("example.com", &["example.net"])]);

        registry(&t)
            .delete_alias(&mut user, "example.com", "example.net")
            .await
            .unwrap();

        assert!(!user.has_alias("example.net"));
        assert!(t.backend.alias_target("example.net").await.is_none());
        assert_eq!(t.backend.call_count("delete_dkim").await, 1);
    }

    #[tokio::test]
    async fn delete_alias_tolerates_backend_already_deleted() {
        let t = create_test_context();
        let reg = registry(&t);

        // 后端已无该别名；本地列表仍保留它
        for _ in 0..2 {
            let mut user = user_with_domains("u1", &[("example.com", &["example.net"])]);
            reg.delete_alias(&mut user, "example.com", "example.net")
                .await
                .unwrap();
            assert!(!user.has_alias("example.net"));
        }
        assert_eq!(t.backend.call_count("delete_domain_alias").await, 0);
    }

    #[tokio::test]
    async fn delete_alias_propagates_other_backend_errors() {
        let t = create_test_context();
        t.backend.add_alias("a1", "example.net", "example.com").await;
        t.backend
            .fail_on(
                "delete_domain_alias",
                BackendError::Timeout {
                    detail: "10s".into(),
                },
            )
            .await;
        let mut user = user_with_domains("u1", &[("example.com", &["example.net"])]);

        let err = registry(&t)
            .delete_alias(&mut user, "example.com", "example.net")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Backend(BackendError::Timeout { .. })));
        assert!(user.has_alias("example.net"));
    }

    #[tokio::test]
    async fn delete_alias_unknown_alias() {
        let t = create_test_context();
        let mut user = user_with_domains("u1", &[("example.com", &[])]);
        let err = registry(&t)
            .delete_alias(&mut user, "example.com", "example.net")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::DomainNotFound(ref d) if d == "example.net"));
    }
}
