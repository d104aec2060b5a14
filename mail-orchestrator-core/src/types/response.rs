//! 批量操作结果类型

use serde::{Deserialize, Serialize};

/// 批量删除失败项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteFailure {
    /// 域名
    pub domain: String,
    /// 失败原因
    pub reason: String,
}

/// 批量删除结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchDeleteResult {
    /// 成功数量
    pub success_count: usize,
    /// 失败数量
    pub failed_count: usize,
    /// 失败详情
    pub failures: Vec<BatchDeleteFailure>,
}
