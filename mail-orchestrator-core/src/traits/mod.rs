//! 存储、解析器与队列抽象 trait 定义

mod dns_resolver;
mod job_queue;
mod job_store;
mod user_repository;

pub use dns_resolver::{DnsAnswer, DnsResolver, TxtRecord};
pub use job_queue::{JobListener, JobProcessor, JobQueue, ProgressReporter};
pub use job_store::{InMemoryJobStore, JobStore};
pub use user_repository::{InMemoryUserRepository, UserRepository};
