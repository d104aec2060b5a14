//! 级联删除
//!
//! 删除域名后，依赖于该域名的后端资源（邮箱账户、转发地址、域名别名）
//! 通过异步任务队列分块清理，失败时按指数退避重试。

mod listener;
mod processor;
mod queue;

pub use listener::LoggingJobListener;
pub use processor::{chunk_progress, DeletionProcessor, DELETE_CHUNK_SIZE};
pub use queue::{DeletionQueue, RetryPolicy, QUEUE_NAME};
