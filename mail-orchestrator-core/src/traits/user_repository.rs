//! 用户持久化抽象 Trait

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::User;
use crate::utils::domain_name::canonical;

/// 用户文档仓库 Trait
///
/// 平台实现：
/// - Actix-Web: `SqliteStore` (`SeaORM`)
/// - 测试 / 本地运行：`InMemoryUserRepository`
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// 根据 ID 获取用户
    ///
    /// # Arguments
    /// * `id` - 用户 ID
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>>;

    /// 保存用户（新增或更新），替换其域名列表
    ///
    /// # Arguments
    /// * `user` - 用户数据
    async fn save(&self, user: &User) -> CoreResult<()>;

    /// 以主域名或别名持有 `domain` 的用户数
    ///
    /// # Arguments
    /// * `domain` - 域名
    async fn count_by_domain(&self, domain: &str) -> CoreResult<u64>;
}

/// 内存用户仓库
///
/// 默认实现，适用于所有平台。
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    /// 创建空仓库
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn save(&self, user: &User) -> CoreResult<()> {
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn count_by_domain(&self, domain: &str) -> CoreResult<u64> {
        let domain = canonical(domain);
        let users = self.users.read().await;
        let count = users
            .values()
            .filter(|u| u.claimed_names().any(|(name, _)| canonical(name) == domain))
            .count();
        Ok(count as u64)
    }
}
