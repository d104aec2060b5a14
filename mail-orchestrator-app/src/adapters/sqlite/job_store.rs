//! `JobStore` implementation for `SqliteStore`.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};

use mail_orchestrator_core::error::{CoreError, CoreResult};
use mail_orchestrator_core::traits::JobStore;
use mail_orchestrator_core::types::{DeletionJob, DeletionPayload, JobKind, JobState};

use super::entity::deletion_job;
use super::{format_timestamp, parse_timestamp, SqliteStore};

impl deletion_job::Model {
    /// Convert a row into a `DeletionJob`, rejecting unknown kinds and states.
    fn into_job(self) -> CoreResult<DeletionJob> {
        let kind = JobKind::parse(&self.kind)
            .ok_or_else(|| CoreError::SerializationError(format!("Invalid kind: {}", self.kind)))?;
        let state = JobState::parse(&self.state).ok_or_else(|| {
            CoreError::SerializationError(format!("Invalid state: {}", self.state))
        })?;
        let attempts_made = u32::try_from(self.attempts_made).map_err(|e| {
            CoreError::SerializationError(format!("Invalid attempts_made: {e}"))
        })?;
        let progress = u8::try_from(self.progress)
            .map_err(|e| CoreError::SerializationError(format!("Invalid progress: {e}")))?;

        Ok(DeletionJob {
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            id: self.id,
            kind,
            payload: DeletionPayload::new(self.user_id, self.domain),
            state,
            attempts_made,
            progress,
            last_error: self.last_error,
        })
    }
}

fn job_to_active_model(job: &DeletionJob) -> deletion_job::ActiveModel {
    deletion_job::ActiveModel {
        id: Set(job.id.clone()),
        kind: Set(job.kind.as_str().to_string()),
        user_id: Set(job.payload.user.clone()),
        domain: Set(job.payload.domain.clone()),
        state: Set(job.state.as_str().to_string()),
        attempts_made: Set(i32::try_from(job.attempts_made).unwrap_or(i32::MAX)),
        progress: Set(i32::from(job.progress)),
        last_error: Set(job.last_error.clone()),
        created_at: Set(format_timestamp(&job.created_at)),
        updated_at: Set(format_timestamp(&job.updated_at)),
    }
}

#[async_trait]
impl JobStore for SqliteStore {
    async fn insert(&self, job: &DeletionJob) -> CoreResult<()> {
        deletion_job::Entity::insert(job_to_active_model(job))
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to insert job: {e}")))?;
        Ok(())
    }

    async fn update(&self, job: &DeletionJob) -> CoreResult<()> {
        job_to_active_model(job)
            .update(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to update job {}: {e}", job.id)))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<DeletionJob>> {
        let row = deletion_job::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query job: {e}")))?;

        row.map(deletion_job::Model::into_job).transpose()
    }

    async fn find_unfinished(&self) -> CoreResult<Vec<DeletionJob>> {
        let rows = deletion_job::Entity::find()
            .filter(deletion_job::Column::State.is_in([
                JobState::Waiting.as_str(),
                JobState::Active.as_str(),
            ]))
            .order_by_asc(deletion_job::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query jobs: {e}")))?;

        rows.into_iter().map(deletion_job::Model::into_job).collect()
    }
}
