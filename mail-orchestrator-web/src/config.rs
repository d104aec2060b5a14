//! TOML configuration.
//!
//! Every section has defaults so a partial file is enough; [`Config::validate`]
//! rejects the values the service cannot run without.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use mail_orchestrator_backend::{BackendConfig, DEFAULT_REQUEST_TIMEOUT_SECS};
use mail_orchestrator_core::services::RetryPolicy;
use mail_orchestrator_core::types::{DnsPolicy, MxRecord};
use serde::Deserialize;

/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "MAIL_ORCHESTRATOR_CONFIG";
/// Config file used when the variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendSection,
    pub database: DatabaseConfig,
    pub dns: DnsConfig,
    pub queue: QueueConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// HTTP worker threads; actix picks one per core when unset
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            workers: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendSection {
    pub url: String,
    pub access_token: String,
    pub timeout_secs: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            access_token: String::new(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BackendSection {
    pub fn to_backend_config(&self) -> BackendConfig {
        BackendConfig::new(self.url.clone(), self.access_token.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/mail-orchestrator.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MxEntry {
    pub exchange: String,
    pub priority: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    pub mx: Vec<MxEntry>,
    pub spf: String,
    pub spf_invalid_pattern: Option<String>,
    /// Resolvers to query; system configuration when empty
    pub nameservers: Vec<IpAddr>,
}

impl DnsConfig {
    pub fn to_policy(&self) -> anyhow::Result<DnsPolicy> {
        let mx = self
            .mx
            .iter()
            .map(|m| MxRecord::new(m.exchange.clone(), m.priority))
            .collect();
        DnsPolicy::new(mx, self.spf.clone(), self.spf_invalid_pattern.as_deref())
            .context("invalid [dns] section")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub workers: usize,
    pub attempts: u32,
    pub backoff_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            workers: 1,
            attempts: policy.attempts,
            backoff_ms: u64::try_from(policy.backoff.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl QueueConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from `MAIL_ORCHESTRATOR_CONFIG`, or `config.toml` if it exists.
    ///
    /// A missing default file yields the built-in defaults; a missing file
    /// named explicitly is an error.
    pub fn from_env() -> anyhow::Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(Path::new(&path)),
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Reject settings the service cannot start with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.backend.access_token.is_empty() {
            bail!("[backend] access_token is required");
        }
        if self.backend.timeout_secs == 0 {
            bail!("[backend] timeout_secs must be positive");
        }
        if self.dns.mx.is_empty() {
            bail!("[dns] at least one mx entry is required");
        }
        if self.dns.spf.trim().is_empty() {
            bail!("[dns] spf is required");
        }
        if self.queue.workers == 0 {
            bail!("[queue] workers must be at least 1");
        }
        if self.queue.attempts == 0 {
            bail!("[queue] attempts must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [server]
        port = 8081

        [backend]
        url = "http://backend:8080"
        access_token = "secret"

        [dns]
        spf = "v=spf1 include:_spf.mail.example -all"
        spf_invalid_pattern = '\+all'
        mx = [{ exchange = "mx1.mail.example", priority = 10 }]

        [queue]
        attempts = 3
    "#;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.queue.workers, 1);
        assert_eq!(config.queue.attempts, 5);
        assert_eq!(config.queue.backoff_ms, 6000);
        assert_eq!(config.log.level, "info");
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = Config::parse(FULL).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.queue.attempts, 3);
        assert_eq!(config.queue.backoff_ms, 6000);
        config.validate().unwrap();
    }

    #[test]
    fn dns_section_builds_policy() {
        let config = Config::parse(FULL).unwrap();
        let policy = config.dns.to_policy().unwrap();
        assert_eq!(policy.mx, vec![MxRecord::new("mx1.mail.example", 10)]);
        assert!(policy.spf_invalid_pattern.is_some());
    }

    #[test]
    fn bad_spf_pattern_is_rejected() {
        let mut config = Config::parse(FULL).unwrap();
        config.dns.spf_invalid_pattern = Some("(".to_string());
        assert!(config.dns.to_policy().is_err());
    }

    #[test]
    fn retry_policy_from_queue_section() {
        let config = Config::parse(FULL).unwrap();
        let policy = config.queue.retry_policy();
        assert_eq!(policy.attempts, 3);
        assert_eq!(policy.backoff, Duration::from_millis(6000));
    }

    #[test]
    fn missing_token_fails_validation() {
        let mut config = Config::parse(FULL).unwrap();
        config.backend.access_token.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("access_token"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, FULL).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.backend.url, "http://backend:8080");

        assert!(Config::load(&dir.path().join("missing.toml")).is_err());
    }
}
