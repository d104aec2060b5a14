//! 用户与域名类型

use serde::{Deserialize, Serialize};

use crate::utils::domain_name::canonical;

/// 持有邮件域名列表的客户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// 用户 ID
    pub id: String,
    /// 主域名列表，各自包含别名
    #[serde(default)]
    pub domains: Vec<Domain>,
}

/// 用户拥有的邮件域名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// FQDN（小写 ASCII，不含末尾点）
    pub domain: String,
    /// 由用户自行添加
    #[serde(default = "default_admin")]
    pub admin: bool,
    /// 后端是否存在 DKIM 密钥（读取时实时填充）
    #[serde(default)]
    pub dkim: bool,
    /// 域名别名
    #[serde(default)]
    pub aliases: Vec<DomainAlias>,
}

/// 指向主域名的别名域名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainAlias {
    /// 别名 FQDN
    pub domain: String,
    /// 后端是否存在 DKIM 密钥（读取时实时填充）
    #[serde(default)]
    pub dkim: bool,
}

/// 用户持有域名的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimKind {
    Primary,
    Alias,
}

impl ClaimKind {
    /// 存储层使用的字符串表示
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Alias => "alias",
        }
    }
}

fn default_admin() -> bool {
    true
}

impl Domain {
    /// 用户添加的域名，尚无别名
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            admin: true,
            dkim: false,
            aliases: Vec::new(),
        }
    }

    /// `alias` 是否属于该域名
    #[must_use]
    pub fn has_alias(&self, alias: &str) -> bool {
        let alias = canonical(alias);
        self.aliases.iter().any(|a| canonical(&a.domain) == alias)
    }
}

impl DomainAlias {
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            dkim: false,
        }
    }
}

impl User {
    /// 没有任何域名的用户
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domains: Vec::new(),
        }
    }

    /// 按名称查找主域名
    #[must_use]
    pub fn find_domain(&self, domain: &str) -> Option<&Domain> {
        let domain = canonical(domain);
        self.domains.iter().find(|d| canonical(&d.domain) == domain)
    }

    pub fn find_domain_mut(&mut self, domain: &str) -> Option<&mut Domain> {
        let domain = canonical(domain);
        self.domains
            .iter_mut()
            .find(|d| canonical(&d.domain) == domain)
    }

    /// `domain` 是否为用户的主域名
    #[must_use]
    pub fn has_domain(&self, domain: &str) -> bool {
        self.find_domain(domain).is_some()
    }

    /// `alias` 是否为用户某个域名的别名
    #[must_use]
    pub fn has_alias(&self, alias: &str) -> bool {
        self.domains.iter().any(|d| d.has_alias(alias))
    }

    /// 用户是否以主域名或别名持有 `name`
    #[must_use]
    pub fn owns(&self, name: &str) -> bool {
        self.has_domain(name) || self.has_alias(name)
    }

    /// 移除主域名（连同其别名）
    pub fn remove_domain(&mut self, domain: &str) -> Option<Domain> {
        let domain = canonical(domain);
        let index = self
            .domains
            .iter()
            .position(|d| canonical(&d.domain) == domain)?;
        Some(self.domains.remove(index))
    }

    /// 用户持有的所有名称及持有方式
    pub fn claimed_names(&self) -> impl Iterator<Item = (&str, ClaimKind)> + '_ {
        self.domains.iter().flat_map(|d| {
            std::iter::once((d.domain.as_str(), ClaimKind::Primary)).chain(
                d.aliases
                    .iter()
                    .map(|a| (a.domain.as_str(), ClaimKind::Alias)),
            )
        })
    }
}
