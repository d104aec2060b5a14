//! DNS 配置检查服务
//!
//! 对比域名当前发布的 NS / MX / SPF / DKIM 记录与策略要求的值。

use std::sync::Arc;

use mail_orchestrator_backend::DkimKey;

use crate::error::CoreResult;
use crate::services::ServiceContext;
use crate::traits::TxtRecord;
use crate::types::{
    DkimValue, DnsCheckCode, DnsCheckIssue, DnsCheckResult, DnsCheckType, DnsPolicy, MxRecord,
};
use crate::utils::domain_name::canonical;

const SPF_TAG: &str = "v=spf1";
const DKIM_TAG: &str = "v=DKIM1";

/// 单类记录的检查结果
struct Outcome<T> {
    value: T,
    errors: Vec<DnsCheckIssue>,
}

/// DNS 配置检查服务
pub struct DnsVerifier {
    ctx: Arc<ServiceContext>,
    policy: Arc<DnsPolicy>,
}

impl DnsVerifier {
    /// 创建 DNS 检查服务实例
    #[must_use]
    pub fn new(ctx: Arc<ServiceContext>, policy: Arc<DnsPolicy>) -> Self {
        Self { ctx, policy }
    }

    /// 检查域名的邮件 DNS 配置
    ///
    /// 没有 NS 记录时只返回 `NsNotFound`，不再检查其他记录。
    /// 错误按 MX、SPF、DKIM 的顺序合并。
    pub async fn check(&self, domain: &str) -> CoreResult<DnsCheckResult> {
        let dkim_key = self.ctx.backend.find_dkim(domain).await?;
        let expected_dkim = dkim_key.as_ref().map(|key| DkimValue {
            selector: key.selector.clone(),
            value: key.dns_txt.value.clone(),
        });
        let mut result = DnsCheckResult::new(self.policy.expected_values(expected_dkim));

        if self.ctx.resolver.resolve_ns(domain).await?.is_empty() {
            log::debug!("[dns-check] {domain}: no nameservers");
            result.errors.push(DnsCheckIssue::new(
                DnsCheckType::Ns,
                DnsCheckCode::NsNotFound,
                format!("No nameservers found for {domain}"),
            ));
            return Ok(result);
        }

        let (mx, spf, dkim) = futures::try_join!(
            self.check_mx(domain),
            self.check_spf(domain),
            self.check_dkim(domain, dkim_key.as_ref()),
        )?;

        result.current_values.mx = mx.value;
        result.current_values.spf = spf.value;
        result.current_values.dkim = dkim.value;
        result.errors.extend(mx.errors);
        result.errors.extend(spf.errors);
        result.errors.extend(dkim.errors);

        log::debug!(
            "[dns-check] {domain}: {} error(s), {} warning(s)",
            result.errors.len(),
            result.warnings.len()
        );
        Ok(result)
    }

    async fn check_mx(&self, domain: &str) -> CoreResult<Outcome<Vec<MxRecord>>> {
        let records = self.ctx.resolver.resolve_mx(domain).await?.into_records();
        let errors = evaluate_mx(domain, &records, &self.policy.mx);
        Ok(Outcome {
            value: records,
            errors,
        })
    }

    async fn check_spf(&self, domain: &str) -> CoreResult<Outcome<Option<String>>> {
        let records = self.ctx.resolver.resolve_txt(domain).await?.into_records();
        Ok(evaluate_spf(domain, &records, &self.policy))
    }

    async fn check_dkim(
        &self,
        domain: &str,
        key: Option<&DkimKey>,
    ) -> CoreResult<Outcome<Option<DkimValue>>> {
        let Some(key) = key else {
            return Ok(Outcome {
                value: None,
                errors: Vec::new(),
            });
        };
        let name = format!("{}._domainkey.{domain}", key.selector);
        let records = self.ctx.resolver.resolve_txt(&name).await?.into_records();
        Ok(evaluate_dkim(&name, &records, key))
    }
}

fn evaluate_mx(domain: &str, records: &[MxRecord], expected: &[MxRecord]) -> Vec<DnsCheckIssue> {
    let mut errors = Vec::new();
    if records.is_empty() {
        errors.push(DnsCheckIssue::new(
            DnsCheckType::Mx,
            DnsCheckCode::MxNotFound,
            format!("No MX records found for {domain}"),
        ));
    }
    for wanted in expected {
        let wanted_name = canonical(&wanted.exchange);
        if !records.iter().any(|r| canonical(&r.exchange) == wanted_name) {
            errors.push(DnsCheckIssue::new(
                DnsCheckType::Mx,
                DnsCheckCode::MxNotFound,
                format!("MX record {wanted_name} is missing for {domain}"),
            ));
        }
    }
    errors
}

fn evaluate_spf(domain: &str, records: &[TxtRecord], policy: &DnsPolicy) -> Outcome<Option<String>> {
    let spf: Vec<String> = records
        .iter()
        .map(TxtRecord::joined)
        .filter(|txt| txt.contains(SPF_TAG))
        .collect();

    let Some(first) = spf.first() else {
        return Outcome {
            value: None,
            errors: vec![DnsCheckIssue::new(
                DnsCheckType::Spf,
                DnsCheckCode::SpfNotFound,
                format!("No SPF record found for {domain}"),
            )],
        };
    };

    let mut errors = Vec::new();
    if spf.len() > 1 {
        errors.push(DnsCheckIssue::new(
            DnsCheckType::Spf,
            DnsCheckCode::SpfMultipleFound,
            format!("{} SPF records found for {domain}, only one is allowed", spf.len()),
        ));
    }
    if policy
        .spf_invalid_pattern
        .as_ref()
        .is_some_and(|re| re.is_match(first))
    {
        errors.push(DnsCheckIssue::new(
            DnsCheckType::Spf,
            DnsCheckCode::SpfInvalid,
            format!("SPF record for {domain} is invalid, expected {}", policy.spf),
        ));
    }

    Outcome {
        value: Some(first.clone()),
        errors,
    }
}

fn evaluate_dkim(name: &str, records: &[TxtRecord], key: &DkimKey) -> Outcome<Option<DkimValue>> {
    let dkim: Vec<String> = records
        .iter()
        .map(TxtRecord::joined)
        .filter(|txt| txt.contains(DKIM_TAG))
        .collect();

    let Some(first) = dkim.first() else {
        return Outcome {
            value: None,
            errors: vec![DnsCheckIssue::new(
                DnsCheckType::Dkim,
                DnsCheckCode::DkimNotFound,
                format!("No DKIM record found at {name}"),
            )],
        };
    };

    let mut errors = Vec::new();
    if dkim.len() > 1 {
        errors.push(DnsCheckIssue::new(
            DnsCheckType::Dkim,
            DnsCheckCode::DkimMultipleFound,
            format!("{} DKIM records found at {name}, only one is allowed", dkim.len()),
        ));
    }
    if *first != key.dns_txt.value {
        errors.push(DnsCheckIssue::new(
            DnsCheckType::Dkim,
            DnsCheckCode::DkimInvalid,
            format!("DKIM record at {name} does not match the signing key"),
        ));
    }

    Outcome {
        value: Some(DkimValue {
            selector: key.selector.clone(),
            value: first.clone(),
        }),
        errors,
    }
}
