//! 删除任务类型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 删除任务清理的关联资源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    DeleteAccounts,
    DeleteForwarders,
    DeleteAliases,
}

impl JobKind {
    /// 移除域名时入队的任务
    pub const ALL: [Self; 3] = [
        Self::DeleteAccounts,
        Self::DeleteForwarders,
        Self::DeleteAliases,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeleteAccounts => "deleteAccounts",
            Self::DeleteForwarders => "deleteForwarders",
            Self::DeleteAliases => "deleteAliases",
        }
    }

    /// 从存储字符串解析
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Waiting,
    Active,
    Completed,
    Failed,
}

impl JobState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "waiting" => Some(Self::Waiting),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// 已完成或已放弃
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// 删除任务的操作对象
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionPayload {
    /// 所属用户 ID
    pub user: String,
    /// 被移除的域名
    pub domain: String,
}

impl DeletionPayload {
    #[must_use]
    pub fn new(user: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            domain: domain.into(),
        }
    }
}

/// 持久化的删除任务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionJob {
    pub id: String,
    pub kind: JobKind,
    pub payload: DeletionPayload,
    pub state: JobState,
    /// 已失败的运行次数
    pub attempts_made: u32,
    /// 0-100
    pub progress: u8,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DeletionJob {
    /// 创建带随机 ID 的等待中任务
    #[must_use]
    pub fn new(kind: JobKind, payload: DeletionPayload) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            payload,
            state: JobState::Waiting,
            attempts_made: 0,
            progress: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 切换到 `state` 并更新 `updated_at`
    pub fn transition(&mut self, state: JobState) {
        self.state = state;
        self.updated_at = Utc::now();
    }
}
