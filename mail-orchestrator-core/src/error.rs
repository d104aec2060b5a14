//! 统一错误类型定义

use serde::Serialize;
use thiserror::Error;

// 重新导出后端网关错误类型
pub use mail_orchestrator_backend::BackendError;

/// 核心层错误类型
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// 域名已属于当前用户（主域名或别名）
    #[error("This domain is already added to your account: {0}")]
    DomainExists(String),

    /// 域名已被其他用户占用
    #[error("This domain is already claimed by another user: {0}")]
    DomainClaimed(String),

    /// 域名不在用户的域名列表中
    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    /// 别名已在后端注册
    #[error("This alias already exists: {0}")]
    AliasExists(String),

    /// DKIM 密钥不存在
    #[error("DKIM key not found: {0}")]
    DkimNotFound(String),

    /// 转发地址不存在
    #[error("Forwarder not found: {0}")]
    ForwarderNotFound(String),

    /// 邮箱账户不存在
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// 未知用户
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// 校验错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// DNS 解析失败（不含空应答）
    #[error("DNS error: {0}")]
    DnsError(String),

    /// 存储层错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 任务队列错误
    #[error("Queue error: {0}")]
    QueueError(String),

    /// 序列化错误
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 内部状态异常
    #[error("Internal error: {0}")]
    Internal(String),

    /// 后端错误（由网关错误转换）
    #[error("{0}")]
    Backend(#[from] BackendError),
}

impl CoreError {
    /// 暴露给 API 调用方的机器可读错误码
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::DomainExists(_) => "DomainExistsError",
            Self::DomainClaimed(_) => "DomainClaimedError",
            Self::DomainNotFound(_) => "DomainNotFoundError",
            Self::AliasExists(_) => "AliasExistsError",
            Self::DkimNotFound(_) => "DkimNotFoundError",
            Self::ForwarderNotFound(_) => "ForwarderNotFoundError",
            Self::AccountNotFound(_) => "AccountNotFoundError",
            Self::UserNotFound(_) => "UserNotFoundError",
            Self::ValidationError(_) => "ValidationError",
            Self::DnsError(_) => "DnsError",
            Self::StorageError(_) => "StorageError",
            Self::QueueError(_) => "QueueError",
            Self::SerializationError(_) => "SerializationError",
            Self::Internal(_) => "InternalError",
            Self::Backend(e) => match e {
                BackendError::AliasExists { .. } => "AliasExistsError",
                BackendError::AddressExists { .. } => "AddressExistsError",
                BackendError::AliasNotFound { .. } => "AliasNotFoundError",
                BackendError::AddressNotFound { .. } => "ForwarderNotFoundError",
                BackendError::UserNotFound { .. } => "AccountNotFoundError",
                BackendError::DkimNotFound { .. } => "DkimNotFoundError",
                BackendError::ChangeNotAllowed { .. } => "ChangeNotAllowedError",
                _ => "InternalError",
            },
        }
    }

    /// 是否为预期行为（用户输入、资源不存在等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::DomainExists(_)
            | Self::DomainClaimed(_)
            | Self::DomainNotFound(_)
            | Self::AliasExists(_)
            | Self::DkimNotFound(_)
            | Self::ForwarderNotFound(_)
            | Self::AccountNotFound(_)
            | Self::UserNotFound(_)
            | Self::ValidationError(_) => true,
            Self::Backend(e) => e.is_expected(),
            _ => false,
        }
    }

    /// 资源不存在（本地或后端）
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::DomainNotFound(_)
            | Self::DkimNotFound(_)
            | Self::ForwarderNotFound(_)
            | Self::AccountNotFound(_)
            | Self::UserNotFound(_) => true,
            Self::Backend(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// 核心层 Result 类型别名
pub type CoreResult<T> = std::result::Result<T, CoreError>;
