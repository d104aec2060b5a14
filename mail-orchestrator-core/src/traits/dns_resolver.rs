//! DNS 解析器抽象 Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::MxRecord;

/// 查询应答：记录列表，或权威的“不存在”
///
/// NXDOMAIN 与 NODATA 均为 [`DnsAnswer::Empty`]；解析失败
/// 则返回 `CoreError::DnsError`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsAnswer<T> {
    Records(Vec<T>),
    Empty,
}

impl<T> DnsAnswer<T> {
    /// 空列表返回 `Empty`
    #[must_use]
    pub fn from_records(records: Vec<T>) -> Self {
        if records.is_empty() {
            Self::Empty
        } else {
            Self::Records(records)
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Records(records) => records.is_empty(),
            Self::Empty => true,
        }
    }

    #[must_use]
    pub fn into_records(self) -> Vec<T> {
        match self {
            Self::Records(records) => records,
            Self::Empty => Vec::new(),
        }
    }
}

/// 按字符串分段的 TXT 记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxtRecord {
    pub chunks: Vec<String>,
}

impl TxtRecord {
    #[must_use]
    pub fn new(chunks: Vec<String>) -> Self {
        Self { chunks }
    }

    /// 无分隔符拼接各分段
    #[must_use]
    pub fn joined(&self) -> String {
        self.chunks.concat()
    }
}

/// DNS 解析器 Trait
///
/// 默认实现：`HickoryDnsResolver`
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// `name` 的名称服务器主机名
    async fn resolve_ns(&self, name: &str) -> CoreResult<DnsAnswer<String>>;

    /// `name` 的 MX 记录
    async fn resolve_mx(&self, name: &str) -> CoreResult<DnsAnswer<MxRecord>>;

    /// `name` 的 TXT 记录
    async fn resolve_txt(&self, name: &str) -> CoreResult<DnsAnswer<TxtRecord>>;
}
