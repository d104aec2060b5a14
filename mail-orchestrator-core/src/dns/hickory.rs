//! 基于 hickory-resolver 的 `DnsResolver` 实现

use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::{
    config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    ResolveError, TokioResolver,
};

use crate::error::{CoreError, CoreResult};
use crate::traits::{DnsAnswer, DnsResolver, TxtRecord};
use crate::types::MxRecord;

/// 使用系统 DNS 配置或指定名称服务器的解析器
#[derive(Clone)]
pub struct HickoryDnsResolver {
    resolver: TokioResolver,
}

impl HickoryDnsResolver {
    /// 使用系统配置（如 `/etc/resolv.conf`）
    ///
    /// 系统配置无法加载时回退到 Hickory 默认的上游服务器。
    #[must_use]
    pub fn from_system_conf() -> Self {
        #[cfg(any(unix, target_os = "windows"))]
        {
            match TokioResolver::builder_tokio() {
                Ok(builder) => {
                    return Self {
                        resolver: builder.build(),
                    };
                }
                Err(e) => {
                    log::warn!(
                        "Failed to load system DNS configuration, falling back to defaults: {e}"
                    );
                }
            }
        }

        Self::with_config(ResolverConfig::default())
    }

    /// 只查询指定的名称服务器（53 端口）
    #[must_use]
    pub fn with_nameservers(ips: &[IpAddr]) -> Self {
        if ips.is_empty() {
            return Self::from_system_conf();
        }
        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(ips, 53, true),
        );
        Self::with_config(config)
    }

    fn with_config(config: ResolverConfig) -> Self {
        let provider = TokioConnectionProvider::default();
        let resolver = TokioResolver::builder_with_config(config, provider)
            .with_options(ResolverOpts::default())
            .build();
        Self { resolver }
    }
}

/// “无记录”与 NXDOMAIN 属于应答，不是失败
fn classify<T>(name: &str, result: Result<Vec<T>, ResolveError>) -> CoreResult<DnsAnswer<T>> {
    match result {
        Ok(records) => Ok(DnsAnswer::from_records(records)),
        Err(e) if e.is_no_records_found() || e.is_nx_domain() => {
            log::debug!("[dns] {name}: no records ({e})");
            Ok(DnsAnswer::Empty)
        }
        Err(e) => Err(CoreError::DnsError(format!("{name}: {e}"))),
    }
}

fn strip_root(name: &str) -> String {
    name.trim_end_matches('.').to_string()
}

#[async_trait]
impl DnsResolver for HickoryDnsResolver {
    async fn resolve_ns(&self, name: &str) -> CoreResult<DnsAnswer<String>> {
        let result: Result<Vec<String>, ResolveError> = self
            .resolver
            .ns_lookup(name)
            .await
            .map(|response| response.iter().map(|ns| strip_root(&ns.to_string())).collect());
        classify(name, result)
    }

    async fn resolve_mx(&self, name: &str) -> CoreResult<DnsAnswer<MxRecord>> {
        let lookup = self.resolver.mx_lookup(name).await;
        let result: Result<Vec<MxRecord>, ResolveError> = lookup.map(|response| {
            response
                .iter()
                .map(|mx| MxRecord::new(strip_root(&mx.exchange().to_string()), mx.preference()))
                .collect()
        });
        classify(name, result)
    }

    async fn resolve_txt(&self, name: &str) -> CoreResult<DnsAnswer<TxtRecord>> {
        let lookup = self.resolver.txt_lookup(name).await;
        let result: Result<Vec<TxtRecord>, ResolveError> = lookup.map(|response| {
            response
                .iter()
                .map(|txt| {
                    TxtRecord::new(
                        txt.iter()
                            .map(|data| String::from_utf8_lossy(data).to_string())
                            .collect(),
                    )
                })
                .collect()
        });
        classify(name, result)
    }
}
