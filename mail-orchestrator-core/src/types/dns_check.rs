//! DNS 检查结果与策略类型

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// 检查问题对应的记录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsCheckType {
    Ns,
    Mx,
    Spf,
    Dkim,
}

/// 机器可读的问题代码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DnsCheckCode {
    NsNotFound,
    MxNotFound,
    SpfNotFound,
    SpfMultipleFound,
    SpfInvalid,
    DkimNotFound,
    DkimMultipleFound,
    DkimInvalid,
}

/// DNS 检查发现的单个问题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsCheckIssue {
    #[serde(rename = "type")]
    pub kind: DnsCheckType,
    pub code: DnsCheckCode,
    pub message: String,
}

impl DnsCheckIssue {
    #[must_use]
    pub fn new(kind: DnsCheckType, code: DnsCheckCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
        }
    }
}

/// MX 记录（`exchange` 不含末尾点）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    pub exchange: String,
    pub priority: u16,
}

impl MxRecord {
    #[must_use]
    pub fn new(exchange: impl Into<String>, priority: u16) -> Self {
        Self {
            exchange: exchange.into(),
            priority,
        }
    }
}

/// DKIM 选择器与 TXT 值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DkimValue {
    pub selector: String,
    pub value: String,
}

/// 邮件相关 DNS 值集合（实际值或期望值）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsValues {
    pub mx: Vec<MxRecord>,
    pub spf: Option<String>,
    pub dkim: Option<DkimValue>,
}

/// 域名邮件 DNS 配置检查结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsCheckResult {
    pub current_values: DnsValues,
    pub correct_values: DnsValues,
    pub errors: Vec<DnsCheckIssue>,
    pub warnings: Vec<DnsCheckIssue>,
}

impl DnsCheckResult {
    #[must_use]
    pub fn new(correct_values: DnsValues) -> Self {
        Self {
            correct_values,
            ..Self::default()
        }
    }

    /// 没有发现错误
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// 每个客户域名都必须发布的邮件 DNS 值
#[derive(Debug, Clone)]
pub struct DnsPolicy {
    /// 域名必须指向的 MX 主机
    pub mx: Vec<MxRecord>,
    /// 需要发布的 SPF 记录
    pub spf: String,
    /// 匹配需要拒绝的 SPF 记录
    pub spf_invalid_pattern: Option<Regex>,
}

impl DnsPolicy {
    /// 构建策略并编译 SPF 无效匹配规则
    pub fn new(
        mx: Vec<MxRecord>,
        spf: impl Into<String>,
        spf_invalid_pattern: Option<&str>,
    ) -> CoreResult<Self> {
        let spf_invalid_pattern = spf_invalid_pattern
            .filter(|p| !p.is_empty())
            .map(Regex::new)
            .transpose()
            .map_err(|e| CoreError::ValidationError(format!("Invalid SPF pattern: {e}")))?;

        Ok(Self {
            mx,
            spf: spf.into(),
            spf_invalid_pattern,
        })
    }

    /// 作为 `correctValues` 返回的值
    #[must_use]
    pub fn expected_values(&self, dkim: Option<DkimValue>) -> DnsValues {
        DnsValues {
            mx: self.mx.clone(),
            spf: Some(self.spf.clone()),
            dkim,
        }
    }
}
