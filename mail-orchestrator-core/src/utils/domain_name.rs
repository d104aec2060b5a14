//! 域名规范化

use crate::error::{CoreError, CoreResult};

/// 文本格式域名的最大长度
const MAX_DOMAIN_LEN: usize = 253;

/// 用于比较的名称形式：去除空白、小写、不含末尾点
#[must_use]
pub fn canonical(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// 校验用户提交的域名并转换为小写 ASCII
///
/// Unicode 标签转换为 Punycode；IP 地址与单标签名称会被拒绝。
pub fn normalize_domain(domain: &str) -> CoreResult<String> {
    let domain = domain.trim().trim_end_matches('.');
    if domain.is_empty() {
        return Err(CoreError::ValidationError(
            "Domain name is required".to_string(),
        ));
    }
    if domain.parse::<std::net::IpAddr>().is_ok() {
        return Err(CoreError::ValidationError(format!(
            "IP addresses are not domain names: {domain}"
        )));
    }

    let ascii_domain = idna::domain_to_ascii_strict(domain)
        .map_err(|_| CoreError::ValidationError(format!("Invalid domain name: {domain}")))?;

    if ascii_domain.len() > MAX_DOMAIN_LEN {
        return Err(CoreError::ValidationError(format!(
            "Domain name exceeds maximum length of {MAX_DOMAIN_LEN} characters (got {})",
            ascii_domain.len()
        )));
    }
    if !ascii_domain.contains('.') {
        return Err(CoreError::ValidationError(format!(
            "Domain name must have at least two labels: {domain}"
        )));
    }
    Ok(ascii_domain)
}
