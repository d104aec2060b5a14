//! 任务队列抽象 Trait
//!
//! 队列运行时拆分为以下接口：
//! - [`JobQueue`]：服务层提交任务的入口
//! - [`JobProcessor`]：工作者执行任务的逻辑
//! - [`ProgressReporter`]：处理器上报进度
//! - [`JobListener`]：状态迁移观察者

use async_trait::async_trait;

use crate::error::{CoreError, CoreResult};
use crate::types::{DeletionJob, DeletionPayload, JobKind};

/// 删除任务的提交入口
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// 持久化并派发任务，返回任务 ID
    async fn enqueue(&self, kind: JobKind, payload: DeletionPayload) -> CoreResult<String>;
}

/// 单次任务运行时交给处理器的进度接收端
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 上报完成百分比（0-100）
    async fn report(&self, progress: u8);
}

/// 任务的执行逻辑
#[async_trait]
pub trait JobProcessor: Send + Sync {
    /// 运行一次任务，返回错误时触发重试策略
    async fn process(&self, job: &DeletionJob, progress: &dyn ProgressReporter)
    -> CoreResult<()>;
}

/// 任务状态迁移观察者，由运行时同步调用
pub trait JobListener: Send + Sync {
    fn on_active(&self, _job: &DeletionJob) {}

    fn on_progress(&self, _job: &DeletionJob, _progress: u8) {}

    fn on_completed(&self, _job: &DeletionJob) {}

    /// 单次运行失败，任务仍可能重试
    fn on_error(&self, _job: &DeletionJob, _error: &CoreError) {}

    /// 重试次数耗尽，任务被放弃
    fn on_failed(&self, _job: &DeletionJob, _error: &CoreError) {}
}
