//! 默认任务监听器：只写日志

use crate::error::CoreError;
use crate::traits::JobListener;
use crate::types::DeletionJob;

/// 每次任务状态迁移写一条日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingJobListener;

impl JobListener for LoggingJobListener {
    fn on_active(&self, job: &DeletionJob) {
        log::info!(
            "[queue] Job {} ({}) for {} active, attempt {}",
            job.id,
            job.kind,
            job.payload.domain,
            job.attempts_made + 1
        );
    }

    fn on_progress(&self, job: &DeletionJob, progress: u8) {
        log::debug!("[queue] Job {} ({}) progress {progress}%", job.id, job.kind);
    }

    fn on_completed(&self, job: &DeletionJob) {
        log::info!(
            "[queue] Job {} ({}) for {} completed",
            job.id,
            job.kind,
            job.payload.domain
        );
    }

    fn on_error(&self, job: &DeletionJob, error: &CoreError) {
        log::warn!(
            "[queue] Job {} ({}) for {} failed on attempt {}: {error}",
            job.id,
            job.kind,
            job.payload.domain,
            job.attempts_made
        );
    }

    fn on_failed(&self, job: &DeletionJob, error: &CoreError) {
        log::error!(
            "[queue] Job {} ({}) for {} abandoned after {} attempts: {error}",
            job.id,
            job.kind,
            job.payload.domain,
            job.attempts_made
        );
    }
}
