//! Platform-agnostic application bootstrap for Mail Orchestrator.
//!
//! Provides `AppState` (service container) and `AppStateBuilder` (adapter
//! injection). Frontends build the state once, call
//! [`AppState::run_startup`] to bring the deletion queue up, and then serve
//! requests through `lifecycle_service`.

pub mod adapters;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mail_orchestrator_backend::MailBackend;
use mail_orchestrator_core::error::{CoreError, CoreResult};
use mail_orchestrator_core::services::{
    DeletionProcessor, DeletionQueue, DomainLifecycleService, LoggingJobListener, RetryPolicy,
    ServiceContext, QUEUE_NAME,
};
use mail_orchestrator_core::traits::{
    DnsResolver, JobListener, JobProcessor, JobQueue, JobStore, UserRepository,
};
use mail_orchestrator_core::types::DnsPolicy;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Worker count when none is configured.
pub const DEFAULT_QUEUE_WORKERS: usize = 1;

/// Platform-agnostic application state.
///
/// Holds the `ServiceContext`, the domain lifecycle service and the deletion
/// queue shared by every request.
pub struct AppState {
    /// Service context (holds all adapters)
    pub ctx: Arc<ServiceContext>,
    /// Domain lifecycle service
    pub lifecycle_service: DomainLifecycleService,
    /// Deletion job queue (also `ctx.job_queue`)
    pub deletion_queue: Arc<DeletionQueue>,
    /// Whether the queue workers are running
    pub queue_started: AtomicBool,
    processor: Arc<dyn JobProcessor>,
    queue_workers: usize,
    worker_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl AppState {
    /// Run the startup sequence: recover unfinished jobs → start workers.
    ///
    /// Returns the number of recovered jobs.
    ///
    /// # Errors
    /// Returns the store error if unfinished jobs cannot be loaded, or
    /// `CoreError::QueueError` if the queue was already started.
    pub async fn run_startup(&self) -> CoreResult<usize> {
        let recovered = match self.deletion_queue.recover().await {
            Ok(count) => count,
            Err(e) => {
                log::error!("Failed to recover {QUEUE_NAME} jobs: {e}");
                return Err(e);
            }
        };

        let handles = self
            .deletion_queue
            .start(self.processor.clone(), self.queue_workers)
            .await?;
        self.worker_handles.lock().await.extend(handles);
        self.queue_started.store(true, Ordering::SeqCst);

        log::info!(
            "Startup complete: {recovered} job(s) recovered, {} worker(s) running",
            self.queue_workers
        );
        Ok(recovered)
    }

    /// Stop the queue workers. Jobs in flight are picked up again by the next
    /// `run_startup` through recovery.
    pub async fn shutdown(&self) {
        let handles: Vec<_> = self.worker_handles.lock().await.drain(..).collect();
        for handle in &handles {
            handle.abort();
        }
        if !handles.is_empty() {
            log::info!("{QUEUE_NAME}: stopped {} worker(s)", handles.len());
        }
        self.queue_started.store(false, Ordering::SeqCst);
    }
}

/// Builder for constructing `AppState` with platform-specific adapters.
///
/// # Required adapters
/// - `user_repository`: where user documents live
/// - `job_store`: where deletion jobs are persisted
/// - `backend`: mail backend gateway
/// - `resolver`: DNS resolver used by DNS checks
/// - `dns_policy`: expected MX/SPF values
///
/// # Optional
/// - `retry_policy`: defaults to `RetryPolicy::default()`
/// - `listeners`: defaults to a single `LoggingJobListener`
/// - `queue_workers`: defaults to [`DEFAULT_QUEUE_WORKERS`]
pub struct AppStateBuilder {
    user_repository: Option<Arc<dyn UserRepository>>,
    job_store: Option<Arc<dyn JobStore>>,
    backend: Option<Arc<dyn MailBackend>>,
    resolver: Option<Arc<dyn DnsResolver>>,
    dns_policy: Option<DnsPolicy>,
    retry_policy: Option<RetryPolicy>,
    listeners: Option<Vec<Arc<dyn JobListener>>>,
    queue_workers: Option<usize>,
}

impl AppStateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            user_repository: None,
            job_store: None,
            backend: None,
            resolver: None,
            dns_policy: None,
            retry_policy: None,
            listeners: None,
            queue_workers: None,
        }
    }

    #[must_use]
    pub fn user_repository(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repository = Some(repo);
        self
    }

    #[must_use]
    pub fn job_store(mut self, store: Arc<dyn JobStore>) -> Self {
        self.job_store = Some(store);
        self
    }

    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn MailBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn resolver(mut self, resolver: Arc<dyn DnsResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn dns_policy(mut self, policy: DnsPolicy) -> Self {
        self.dns_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    #[must_use]
    pub fn listeners(mut self, listeners: Vec<Arc<dyn JobListener>>) -> Self {
        self.listeners = Some(listeners);
        self
    }

    #[must_use]
    pub fn queue_workers(mut self, workers: usize) -> Self {
        self.queue_workers = Some(workers);
        self
    }

    /// Build the `AppState`.
    ///
    /// # Errors
    /// Returns `CoreError::ValidationError` if required adapters are missing
    /// or the worker count is zero.
    pub fn build(self) -> CoreResult<AppState> {
        let user_repository = self.user_repository.ok_or_else(|| {
            CoreError::ValidationError("user_repository is required".to_string())
        })?;
        let job_store = self
            .job_store
            .ok_or_else(|| CoreError::ValidationError("job_store is required".to_string()))?;
        let backend = self
            .backend
            .ok_or_else(|| CoreError::ValidationError("backend is required".to_string()))?;
        let resolver = self
            .resolver
            .ok_or_else(|| CoreError::ValidationError("resolver is required".to_string()))?;
        let dns_policy = self
            .dns_policy
            .ok_or_else(|| CoreError::ValidationError("dns_policy is required".to_string()))?;
        let queue_workers = self.queue_workers.unwrap_or(DEFAULT_QUEUE_WORKERS);
        if queue_workers == 0 {
            return Err(CoreError::ValidationError(
                "queue_workers must be at least 1".to_string(),
            ));
        }
        let listeners = self
            .listeners
            .unwrap_or_else(|| vec![Arc::new(LoggingJobListener) as Arc<dyn JobListener>]);

        let deletion_queue = Arc::new(DeletionQueue::new(
            job_store,
            self.retry_policy.unwrap_or_default(),
            listeners,
        ));
        let processor: Arc<dyn JobProcessor> =
            Arc::new(DeletionProcessor::new(Arc::clone(&backend)));

        let job_queue: Arc<dyn JobQueue> = deletion_queue.clone();
        let ctx = Arc::new(ServiceContext::new(
            user_repository,
            backend,
            resolver,
            job_queue,
        ));
        let lifecycle_service = DomainLifecycleService::new(Arc::clone(&ctx), Arc::new(dns_policy));

        Ok(AppState {
            ctx,
            lifecycle_service,
            deletion_queue,
            queue_started: AtomicBool::new(false),
            processor,
            queue_workers,
            worker_handles: Mutex::new(Vec::new()),
        })
    }
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
