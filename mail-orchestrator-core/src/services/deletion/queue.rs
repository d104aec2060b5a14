//! 删除任务队列运行时
//!
//! 任务先写入 `JobStore`，再通过 mpsc 通道分发给 worker。
//! 失败的任务在退避延迟后重新入队；重试次数耗尽后标记为 `failed` 并放弃。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::error::{CoreError, CoreResult};
use crate::traits::{JobListener, JobProcessor, JobQueue, JobStore, ProgressReporter};
use crate::types::{DeletionJob, DeletionPayload, JobKind, JobState};

/// 队列名称，用于日志
pub const QUEUE_NAME: &str = "deleteForDomain";

/// 单次退避延迟上限
const MAX_BACKOFF: Duration = Duration::from_secs(24 * 60 * 60);

/// 指数退避重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 任务总运行次数（含首次）
    pub attempts: u32,
    /// 首次重试前的延迟，之后每次翻倍
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Duration::from_millis(6000),
        }
    }
}

impl RetryPolicy {
    /// 失败 `attempts_made` 次后，下次运行前的延迟
    #[must_use]
    pub fn delay_for(&self, attempts_made: u32) -> Duration {
        let exponent = attempts_made.saturating_sub(1).min(31);
        self.backoff
            .checked_mul(1u32 << exponent)
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }

    /// 失败 `attempts_made` 次后是否允许再次运行
    #[must_use]
    pub fn should_retry(&self, attempts_made: u32) -> bool {
        attempts_made < self.attempts
    }
}

struct QueueInner {
    store: Arc<dyn JobStore>,
    policy: RetryPolicy,
    listeners: Vec<Arc<dyn JobListener>>,
    sender: mpsc::UnboundedSender<String>,
}

/// 带工作池的持久化删除任务队列
pub struct DeletionQueue {
    inner: Arc<QueueInner>,
    receiver: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
}

impl DeletionQueue {
    /// 创建队列；调用 [`DeletionQueue::start`] 后才开始执行任务
    #[must_use]
    pub fn new(
        store: Arc<dyn JobStore>,
        policy: RetryPolicy,
        listeners: Vec<Arc<dyn JobListener>>,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            inner: Arc::new(QueueInner {
                store,
                policy,
                listeners,
                sender,
            }),
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// 启动 `workers` 个使用 `processor` 消费队列的任务
    ///
    /// 只能调用一次；再次调用返回 `QueueError`。
    pub async fn start(
        &self,
        processor: Arc<dyn JobProcessor>,
        workers: usize,
    ) -> CoreResult<Vec<JoinHandle<()>>> {
        let receiver = self
            .receiver
            .lock()
            .await
            .take()
            .ok_or_else(|| CoreError::QueueError(format!("{QUEUE_NAME} already started")))?;
        let receiver = Arc::new(Mutex::new(receiver));
        let workers = workers.max(1);

        log::info!("[queue] {QUEUE_NAME}: starting {workers} worker(s)");
        let handles = (0..workers)
            .map(|_| {
                let inner = self.inner.clone();
                let receiver = receiver.clone();
                let processor = processor.clone();
                tokio::spawn(async move {
                    loop {
                        let next = receiver.lock().await.recv().await;
                        let Some(job_id) = next else { break };
                        inner.run(&job_id, processor.as_ref()).await;
                    }
                })
            })
            .collect();
        Ok(handles)
    }

    /// 重新派发上一进程遗留的 `waiting` 或 `active` 任务
    pub async fn recover(&self) -> CoreResult<usize> {
        let jobs = self.inner.store.find_unfinished().await?;
        let count = jobs.len();
        for mut job in jobs {
            if job.state == JobState::Active {
                job.transition(JobState::Waiting);
                self.inner.store.update(&job).await?;
            }
            self.inner.dispatch(&job.id)?;
        }
        if count > 0 {
            log::info!("[queue] {QUEUE_NAME}: recovered {count} unfinished job(s)");
        }
        Ok(count)
    }
}

#[async_trait]
impl JobQueue for DeletionQueue {
    async fn enqueue(&self, kind: JobKind, payload: DeletionPayload) -> CoreResult<String> {
        let job = DeletionJob::new(kind, payload);
        self.inner.store.insert(&job).await?;
        self.inner.dispatch(&job.id)?;
        log::info!(
            "[queue] {QUEUE_NAME}: enqueued {} ({kind}) for {}",
            job.id,
            job.payload.domain
        );
        Ok(job.id)
    }
}

impl QueueInner {
    fn dispatch(&self, job_id: &str) -> CoreResult<()> {
        self.sender
            .send(job_id.to_string())
            .map_err(|_| CoreError::QueueError(format!("{QUEUE_NAME} is closed")))
    }

    async fn persist(&self, job: &DeletionJob) {
        if let Err(e) = self.store.update(job).await {
            log::error!("[queue] Failed to persist job {}: {e}", job.id);
        }
    }

    async fn run(self: &Arc<Self>, job_id: &str, processor: &dyn JobProcessor) {
        let mut job = match self.store.find_by_id(job_id).await {
            Ok(Some(job)) if !job.state.is_finished() => job,
            Ok(Some(_)) => return,
            Ok(None) => {
                log::warn!("[queue] Job {job_id} disappeared from the store");
                return;
            }
            Err(e) => {
                log::error!("[queue] Failed to load job {job_id}: {e}");
                return;
            }
        };

        job.transition(JobState::Active);
        self.persist(&job).await;
        for listener in &self.listeners {
            listener.on_active(&job);
        }

        let reporter = StoreProgress {
            inner: &**self,
            job: Mutex::new(job.clone()),
        };
        let result = processor.process(&job, &reporter).await;
        job.progress = reporter.job.into_inner().progress;

        match result {
            Ok(()) => {
                job.last_error = None;
                job.transition(JobState::Completed);
                self.persist(&job).await;
                for listener in &self.listeners {
                    listener.on_completed(&job);
                }
            }
            Err(error) => self.fail(job, &error).await,
        }
    }

    async fn fail(self: &Arc<Self>, mut job: DeletionJob, error: &CoreError) {
        job.attempts_made += 1;
        job.last_error = Some(error.to_string());
        for listener in &self.listeners {
            listener.on_error(&job, error);
        }

        if !self.policy.should_retry(job.attempts_made) {
            job.transition(JobState::Failed);
            self.persist(&job).await;
            for listener in &self.listeners {
                listener.on_failed(&job, error);
            }
            return;
        }

        job.transition(JobState::Waiting);
        self.persist(&job).await;

        let delay = self.policy.delay_for(job.attempts_made);
        log::debug!(
            "[queue] Job {} retrying in {}ms",
            job.id,
            delay.as_millis()
        );
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = inner.dispatch(&job.id) {
                log::error!("[queue] Failed to re-dispatch job {}: {e}", job.id);
            }
        });
    }
}

/// 持久化运行中任务的进度
struct StoreProgress<'a> {
    inner: &'a QueueInner,
    job: Mutex<DeletionJob>,
}

#[async_trait]
impl ProgressReporter for StoreProgress<'_> {
    async fn report(&self, progress: u8) {
        let snapshot = {
            let mut job = self.job.lock().await;
            job.progress = progress.min(100);
            job.updated_at = Utc::now();
            job.clone()
        };
        self.inner.persist(&snapshot).await;
        for listener in &self.inner.listeners {
            listener.on_progress(&snapshot, snapshot.progress);
        }
    }
}
