//! 类型定义模块

mod dns_check;
mod job;
mod response;
mod user;

pub use dns_check::{
    DkimValue, DnsCheckCode, DnsCheckIssue, DnsCheckResult, DnsCheckType, DnsPolicy, DnsValues,
    MxRecord,
};
pub use job::{DeletionJob, DeletionPayload, JobKind, JobState};
pub use response::{BatchDeleteFailure, BatchDeleteResult};
pub use user::{ClaimKind, Domain, DomainAlias, User};

// Re-export gateway 库的公共类型
pub use mail_orchestrator_backend::{
    BackendAccount, BackendDomainAlias, BackendForwarder, DkimDnsTxt, DkimKey,
};
