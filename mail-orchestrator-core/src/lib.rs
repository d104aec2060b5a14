//! Mail Orchestrator 核心库
//!
//! 提供邮件域名管理 API 的核心业务逻辑：
//! - 域名注册表（域名与别名的归属及全局唯一性）
//! - 域名邮件 DNS 配置检查（NS、MX、SPF、DKIM）
//! - 通过持久化任务队列级联删除后端资源
//!
//! 本库与平台无关：存储、DNS 与任务队列均通过 trait 抽象，
//! 并经由 [`ServiceContext`] 注入。

pub mod dns;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// 重新导出常用类型
pub use error::{CoreError, CoreResult};
pub use services::ServiceContext;
pub use traits::{DnsResolver, JobListener, JobQueue, JobStore, UserRepository};
