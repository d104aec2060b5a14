//! 删除任务处理器

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use mail_orchestrator_backend::{MailBackend, Result as BackendResult};

use crate::error::{CoreError, CoreResult};
use crate::traits::{JobProcessor, ProgressReporter};
use crate::types::{DeletionJob, JobKind};

/// 每批并发执行的删除数
pub const DELETE_CHUNK_SIZE: usize = 10;

/// 待删除的后端资源
struct Target {
    id: String,
    /// 别名，用于清理 DKIM
    name: Option<String>,
}

/// 完成 `total` 批中的 `done` 批后的进度（四舍五入）
#[must_use]
pub fn chunk_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let percent = (done.min(total) * 200 + total) / (total * 2);
    u8::try_from(percent).unwrap_or(100)
}

/// 清理已移除域名的一类后端资源
///
/// 按 [`DELETE_CHUNK_SIZE`] 分批删除：同一批内并发执行，
/// 整批完成后才开始下一批。
pub struct DeletionProcessor {
    backend: Arc<dyn MailBackend>,
    chunk_size: usize,
}

impl DeletionProcessor {
    #[must_use]
    pub fn new(backend: Arc<dyn MailBackend>) -> Self {
        Self {
            backend,
            chunk_size: DELETE_CHUNK_SIZE,
        }
    }

    async fn fetch_targets(&self, kind: JobKind, domain: &str) -> BackendResult<Vec<Target>> {
        let targets = match kind {
            JobKind::DeleteAccounts => self
                .backend
                .list_accounts(domain)
                .await?
                .into_iter()
                .map(|a| Target { id: a.id, name: None })
                .collect(),
            JobKind::DeleteForwarders => self
                .backend
                .list_forwarders(domain)
                .await?
                .into_iter()
                .map(|f| Target { id: f.id, name: None })
                .collect(),
            JobKind::DeleteAliases => self
                .backend
                .list_domain_aliases(domain)
                .await?
                .into_iter()
                .map(|a| Target {
                    id: a.id,
                    name: Some(a.alias),
                })
                .collect(),
        };
        Ok(targets)
    }

    /// 删除单个目标；已不存在视为删除成功
    async fn delete_one(&self, kind: JobKind, target: &Target) -> BackendResult<()> {
        let result = match kind {
            JobKind::DeleteAccounts => self.backend.delete_account(&target.id).await,
            JobKind::DeleteForwarders => self.backend.delete_forwarder(&target.id).await,
            JobKind::DeleteAliases => self.delete_alias(target).await,
        };
        match result {
            Err(e) if e.is_not_found() => {
                log::debug!("[deletion] {kind} target {} already gone", target.id);
                Ok(())
            }
            other => other,
        }
    }

    async fn delete_alias(&self, target: &Target) -> BackendResult<()> {
        match self.backend.delete_domain_alias(&target.id).await {
            Err(e) if !e.is_not_found() => return Err(e),
            _ => {}
        }
        let Some(name) = target.name.as_deref() else {
            return Ok(());
        };
        let dkim_id = match self.backend.resolve_dkim(name).await {
            Ok(id) => id,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        };
        self.backend.delete_dkim(&dkim_id).await
    }
}

#[async_trait]
impl JobProcessor for DeletionProcessor {
    async fn process(
        &self,
        job: &DeletionJob,
        progress: &dyn ProgressReporter,
    ) -> CoreResult<()> {
        let kind = job.kind;
        let domain = job.payload.domain.as_str();

        let targets = match self.fetch_targets(kind, domain).await {
            Ok(targets) => targets,
            Err(e) if e.is_not_found() => {
                log::info!("[deletion] {kind} for {domain}: nothing to delete ({e})");
                progress.report(100).await;
                return Ok(());
            }
            Err(e) => return Err(CoreError::Backend(e)),
        };

        if targets.is_empty() {
            progress.report(100).await;
            return Ok(());
        }

        let total_chunks = targets.len().div_ceil(self.chunk_size);
        log::info!(
            "[deletion] {kind} for {domain} (user {}): {} target(s) in {total_chunks} chunk(s)",
            job.payload.user,
            targets.len()
        );

        for (index, chunk) in targets.chunks(self.chunk_size).enumerate() {
            let results = join_all(chunk.iter().map(|t| self.delete_one(kind, t))).await;
            if let Some(e) = results.into_iter().find_map(Result::err) {
                return Err(CoreError::Backend(e));
            }
            progress.report(chunk_progress(index + 1, total_chunks)).await;
        }
        Ok(())
    }
}
