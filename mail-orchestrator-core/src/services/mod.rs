//! 业务逻辑服务层

mod deletion;
mod dns_verifier;
mod domain_lifecycle_service;
mod domain_registry;

pub use deletion::{
    chunk_progress, DeletionProcessor, DeletionQueue, LoggingJobListener, RetryPolicy,
    DELETE_CHUNK_SIZE, QUEUE_NAME,
};
pub use dns_verifier::DnsVerifier;
pub use domain_lifecycle_service::DomainLifecycleService;
pub use domain_registry::DomainRegistry;

use std::sync::Arc;

use mail_orchestrator_backend::MailBackend;

use crate::error::{CoreError, CoreResult};
use crate::traits::{DnsResolver, JobQueue, UserRepository};
use crate::types::User;

/// 服务上下文 - 持有所有依赖
///
/// 平台层需要创建此上下文，并注入平台特定的存储实现。
pub struct ServiceContext {
    /// 用户持久化仓库
    pub user_repository: Arc<dyn UserRepository>,
    /// 邮件后端网关
    pub backend: Arc<dyn MailBackend>,
    /// DNS 解析器
    pub resolver: Arc<dyn DnsResolver>,
    /// 删除任务队列
    pub job_queue: Arc<dyn JobQueue>,
}

impl ServiceContext {
    /// 创建服务上下文
    #[must_use]
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        backend: Arc<dyn MailBackend>,
        resolver: Arc<dyn DnsResolver>,
        job_queue: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            user_repository,
            backend,
            resolver,
            job_queue,
        }
    }

    /// 加载用户，不存在时返回 `UserNotFound`
    pub async fn load_user(&self, user_id: &str) -> CoreResult<User> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CoreError::UserNotFound(user_id.to_string()))
    }

    /// 后端是否存在 `domain` 的 DKIM 密钥
    ///
    /// 不存在时返回 `false`；其他后端错误向上传播。
    pub async fn has_dkim(&self, domain: &str) -> CoreResult<bool> {
        match self.backend.resolve_dkim(domain).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// 删除 `domain` 的 DKIM 密钥（如果存在）
    ///
    /// 返回是否删除了密钥。密钥被并发删除不视为错误。
    pub async fn delete_dkim_if_present(&self, domain: &str) -> CoreResult<bool> {
        let id = match self.backend.resolve_dkim(domain).await {
            Ok(id) => id,
            Err(e) if e.is_not_found() => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        match self.backend.delete_dkim(&id).await {
            Ok(()) => {
                log::info!("DKIM key {id} for {domain} deleted");
                Ok(true)
            }
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
