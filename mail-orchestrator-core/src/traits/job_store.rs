//! 删除任务持久化抽象 Trait

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CoreResult;
use crate::types::DeletionJob;

/// 删除任务仓库 Trait
///
/// 任务的生命周期长于创建它的请求；仓库跨重启保存任务，
/// 以便重新派发未完成的任务。
#[async_trait]
pub trait JobStore: Send + Sync {
    /// 保存新任务
    async fn insert(&self, job: &DeletionJob) -> CoreResult<()>;

    /// 覆盖已有任务的状态、尝试次数、进度与错误
    async fn update(&self, job: &DeletionJob) -> CoreResult<()>;

    /// 根据 ID 获取任务
    async fn find_by_id(&self, id: &str) -> CoreResult<Option<DeletionJob>>;

    /// 仍处于 `waiting` 或 `active` 的任务，按创建时间升序
    async fn find_unfinished(&self) -> CoreResult<Vec<DeletionJob>>;
}

/// 内存任务仓库
#[derive(Clone, Default)]
pub struct InMemoryJobStore {
    jobs: Arc<RwLock<HashMap<String, DeletionJob>>>,
}

impl InMemoryJobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 所有任务的快照（用于检查）
    pub async fn all(&self) -> Vec<DeletionJob> {
        let mut jobs: Vec<DeletionJob> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by_key(|j| j.created_at);
        jobs
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn insert(&self, job: &DeletionJob) -> CoreResult<()> {
        self.jobs.write().await.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn update(&self, job: &DeletionJob) -> CoreResult<()> {
        self.jobs.write().await.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<DeletionJob>> {
        Ok(self.jobs.read().await.get(id).cloned())
    }

    async fn find_unfinished(&self) -> CoreResult<Vec<DeletionJob>> {
        let mut jobs: Vec<DeletionJob> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| !j.state.is_finished())
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.created_at);
        Ok(jobs)
    }
}
