//! 测试辅助模块
//!
//! 提供 mock 实现和便捷的测试工厂方法。

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mail_orchestrator_backend::{
    BackendAccount, BackendDomainAlias, BackendError, BackendForwarder, DkimDnsTxt, DkimKey,
    MailBackend, Result as BackendResult,
};
use tokio::sync::RwLock;

use crate::error::{CoreError, CoreResult};
use crate::services::ServiceContext;
use crate::traits::{
    DnsAnswer, DnsResolver, InMemoryUserRepository, JobListener, JobQueue, ProgressReporter,
    TxtRecord, UserRepository,
};
use crate::types::{
    DeletionJob, DeletionPayload, DnsPolicy, Domain, DomainAlias, JobKind, MxRecord, User,
};

// ===== MockMailBackend =====

#[derive(Default)]
struct BackendState {
    accounts: HashMap<String, Vec<BackendAccount>>,
    forwarders: HashMap<String, Vec<BackendForwarder>>,
    aliases: Vec<BackendDomainAlias>,
    dkim: Vec<DkimKey>,
    calls: HashMap<&'static str, usize>,
    /// 方法名 -> (错误, 剩余次数；None 表示一直失败)
    failures: HashMap<&'static str, (BackendError, Option<usize>)>,
    next_id: usize,
}

/// 内存邮件后端，统计调用次数与并发删除数
#[derive(Default)]
pub struct MockMailBackend {
    state: RwLock<BackendState>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockMailBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 让 `method` 每次调用都返回 `err`
    pub async fn fail_on(&self, method: &'static str, err: BackendError) {
        self.state.write().await.failures.insert(method, (err, None));
    }

    /// 让 `method` 的前 `times` 次调用返回 `err`
    pub async fn fail_times(&self, method: &'static str, times: usize, err: BackendError) {
        self.state
            .write()
            .await
            .failures
            .insert(method, (err, Some(times)));
    }

    pub async fn call_count(&self, method: &str) -> usize {
        self.state
            .read()
            .await
            .calls
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    /// 同时进行的删除操作峰值
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub async fn add_accounts(&self, domain: &str, count: usize) {
        let mut state = self.state.write().await;
        let accounts = state.accounts.entry(domain.to_string()).or_default();
        for i in 0..count {
            accounts.push(BackendAccount {
                id: format!("{domain}-acc-{i}"),
                username: format!("user{i}"),
                address: format!("user{i}@{domain}"),
                tags: vec![domain.to_string()],
            });
        }
    }

    pub async fn accounts_of(&self, domain: &str) -> Vec<BackendAccount> {
        self.state
            .read()
            .await
            .accounts
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn add_forwarders(&self, domain: &str, count: usize) {
        let mut state = self.state.write().await;
        let forwarders = state.forwarders.entry(domain.to_string()).or_default();
        for i in 0..count {
            forwarders.push(BackendForwarder {
                id: format!("{domain}-fwd-{i}"),
                address: format!("fwd{i}@{domain}"),
                targets: vec![format!("target{i}@elsewhere.example")],
            });
        }
    }

    pub async fn add_alias(&self, id: &str, alias: &str, domain: &str) {
        self.state.write().await.aliases.push(BackendDomainAlias {
            id: id.to_string(),
            alias: alias.to_string(),
            domain: domain.to_string(),
        });
    }

    /// 已注册别名指向的域名
    pub async fn alias_target(&self, alias: &str) -> Option<String> {
        self.state
            .read()
            .await
            .aliases
            .iter()
            .find(|a| a.alias == alias)
            .map(|a| a.domain.clone())
    }

    pub async fn add_dkim(&self, id: &str, domain: &str, selector: &str, value: &str) {
        self.state.write().await.dkim.push(DkimKey {
            id: id.to_string(),
            domain: domain.to_string(),
            selector: selector.to_string(),
            dns_txt: DkimDnsTxt {
                name: format!("{selector}._domainkey.{domain}"),
                value: value.to_string(),
            },
        });
    }

    fn track(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlight(&self.in_flight)
    }

    /// 记录调用并应用注入的错误
    async fn enter(&self, method: &'static str) -> BackendResult<()> {
        let mut state = self.state.write().await;
        *state.calls.entry(method).or_default() += 1;
        if let Some((err, remaining)) = state.failures.get_mut(method) {
            match remaining {
                None => return Err(err.clone()),
                Some(0) => {}
                Some(n) => {
                    *n -= 1;
                    return Err(err.clone());
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl MailBackend for MockMailBackend {
    async fn list_accounts(&self, domain: &str) -> BackendResult<Vec<BackendAccount>> {
        self.enter("list_accounts").await?;
        Ok(self.accounts_of(domain).await)
    }

    async fn delete_account(&self, id: &str) -> BackendResult<()> {
        let _guard = self.track();
        self.enter("delete_account").await?;
        tokio::task::yield_now().await;

        let mut state = self.state.write().await;
        for accounts in state.accounts.values_mut() {
            if let Some(index) = accounts.iter().position(|a| a.id == id) {
                accounts.remove(index);
                return Ok(());
            }
        }
        Err(BackendError::UserNotFound {
            id: id.to_string(),
            raw_message: None,
        })
    }

    async fn list_forwarders(&self, domain: &str) -> BackendResult<Vec<BackendForwarder>> {
        self.enter("list_forwarders").await?;
        Ok(self
            .state
            .read()
            .await
            .forwarders
            .get(domain)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_forwarder(&self, id: &str) -> BackendResult<()> {
        let _guard = self.track();
        self.enter("delete_forwarder").await?;
        tokio::task::yield_now().await;

        let mut state = self.state.write().await;
        for forwarders in state.forwarders.values_mut() {
            if let Some(index) = forwarders.iter().position(|f| f.id == id) {
                forwarders.remove(index);
                return Ok(());
            }
        }
        Err(BackendError::AddressNotFound {
            id: id.to_string(),
            raw_message: None,
        })
    }

    async fn list_domain_aliases(&self, domain: &str) -> BackendResult<Vec<BackendDomainAlias>> {
        self.enter("list_domain_aliases").await?;
        Ok(self
            .state
            .read()
            .await
            .aliases
            .iter()
            .filter(|a| a.domain == domain)
            .cloned()
            .collect())
    }

    async fn create_domain_alias(&self, alias: &str, domain: &str) -> BackendResult<String> {
        self.enter("create_domain_alias").await?;
        let mut state = self.state.write().await;
        if state.aliases.iter().any(|a| a.alias == alias) {
            return Err(BackendError::AliasExists {
                alias: alias.to_string(),
                raw_message: Some("This alias already exists".to_string()),
            });
        }
        state.next_id += 1;
        let id = format!("alias-{}", state.next_id);
        state.aliases.push(BackendDomainAlias {
            id: id.clone(),
            alias: alias.to_string(),
            domain: domain.to_string(),
        });
        Ok(id)
    }

    async fn resolve_domain_alias(&self, alias: &str) -> BackendResult<String> {
        self.enter("resolve_domain_alias").await?;
        self.state
            .read()
            .await
            .aliases
            .iter()
            .find(|a| a.alias == alias)
            .map(|a| a.id.clone())
            .ok_or_else(|| BackendError::AliasNotFound {
                alias: alias.to_string(),
                raw_message: None,
            })
    }

    async fn delete_domain_alias(&self, id: &str) -> BackendResult<()> {
        let _guard = self.track();
        self.enter("delete_domain_alias").await?;
        tokio::task::yield_now().await;

        let mut state = self.state.write().await;
        let Some(index) = state.aliases.iter().position(|a| a.id == id) else {
            return Err(BackendError::AliasNotFound {
                alias: id.to_string(),
                raw_message: None,
            });
        };
        state.aliases.remove(index);
        Ok(())
    }

    async fn resolve_dkim(&self, domain: &str) -> BackendResult<String> {
        self.enter("resolve_dkim").await?;
        self.state
            .read()
            .await
            .dkim
            .iter()
            .find(|k| k.domain == domain)
            .map(|k| k.id.clone())
            .ok_or_else(|| BackendError::DkimNotFound {
                domain: domain.to_string(),
                raw_message: None,
            })
    }

    async fn get_dkim(&self, id: &str) -> BackendResult<DkimKey> {
        self.enter("get_dkim").await?;
        self.state
            .read()
            .await
            .dkim
            .iter()
            .find(|k| k.id == id)
            .cloned()
            .ok_or_else(|| BackendError::DkimNotFound {
                domain: id.to_string(),
                raw_message: None,
            })
    }

    async fn delete_dkim(&self, id: &str) -> BackendResult<()> {
        self.enter("delete_dkim").await?;
        let mut state = self.state.write().await;
        let Some(index) = state.dkim.iter().position(|k| k.id == id) else {
            return Err(BackendError::DkimNotFound {
                domain: id.to_string(),
                raw_message: None,
            });
        };
        state.dkim.remove(index);
        Ok(())
    }
}

// ===== MockDnsResolver =====

#[derive(Default)]
struct DnsState {
    ns: HashMap<String, Vec<String>>,
    mx: HashMap<String, Vec<MxRecord>>,
    txt: HashMap<String, Vec<TxtRecord>>,
    failing: HashSet<String>,
    lookups: Vec<(String, &'static str)>,
}

/// 静态区域数据；未知名称返回空应答
#[derive(Default)]
pub struct MockDnsResolver {
    state: RwLock<DnsState>,
}

impl MockDnsResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_ns(&self, name: &str, hosts: &[&str]) {
        self.state.write().await.ns.insert(
            name.to_string(),
            hosts.iter().map(ToString::to_string).collect(),
        );
    }

    pub async fn set_mx(&self, name: &str, records: &[(&str, u16)]) {
        self.state.write().await.mx.insert(
            name.to_string(),
            records
                .iter()
                .map(|(exchange, priority)| MxRecord::new(*exchange, *priority))
                .collect(),
        );
    }

    /// 每个内层切片是一条按字符串分段的 TXT 记录
    pub async fn set_txt(&self, name: &str, records: &[&[&str]]) {
        self.state.write().await.txt.insert(
            name.to_string(),
            records
                .iter()
                .map(|chunks| TxtRecord::new(chunks.iter().map(ToString::to_string).collect()))
                .collect(),
        );
    }

    /// 对 `name` 的所有查询均以 SERVFAIL 失败
    pub async fn fail_name(&self, name: &str) {
        self.state.write().await.failing.insert(name.to_string());
    }

    /// 按顺序记录对 `name` 查询过的记录类型
    pub async fn lookups_of(&self, name: &str) -> Vec<&'static str> {
        self.state
            .read()
            .await
            .lookups
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, kind)| *kind)
            .collect()
    }

    async fn enter(&self, name: &str, kind: &'static str) -> CoreResult<()> {
        let mut state = self.state.write().await;
        state.lookups.push((name.to_string(), kind));
        if state.failing.contains(name) {
            return Err(CoreError::DnsError(format!("{name}: SERVFAIL")));
        }
        Ok(())
    }
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve_ns(&self, name: &str) -> CoreResult<DnsAnswer<String>> {
        self.enter(name, "NS").await?;
        let records = self.state.read().await.ns.get(name).cloned();
        Ok(DnsAnswer::from_records(records.unwrap_or_default()))
    }

    async fn resolve_mx(&self, name: &str) -> CoreResult<DnsAnswer<MxRecord>> {
        self.enter(name, "MX").await?;
        let records = self.state.read().await.mx.get(name).cloned();
        Ok(DnsAnswer::from_records(records.unwrap_or_default()))
    }

    async fn resolve_txt(&self, name: &str) -> CoreResult<DnsAnswer<TxtRecord>> {
        self.enter(name, "TXT").await?;
        let records = self.state.read().await.txt.get(name).cloned();
        Ok(DnsAnswer::from_records(records.unwrap_or_default()))
    }
}

// ===== RecordingJobQueue =====

/// 只记录入队内容的任务队列
#[derive(Default)]
pub struct RecordingJobQueue {
    jobs: RwLock<Vec<(JobKind, DeletionPayload)>>,
}

impl RecordingJobQueue {
    pub async fn jobs(&self) -> Vec<(JobKind, DeletionPayload)> {
        self.jobs.read().await.clone()
    }
}

#[async_trait]
impl JobQueue for RecordingJobQueue {
    async fn enqueue(&self, kind: JobKind, payload: DeletionPayload) -> CoreResult<String> {
        self.jobs.write().await.push((kind, payload));
        Ok(uuid::Uuid::new_v4().to_string())
    }
}

// ===== RecordingProgress / RecordingListener =====

#[derive(Default)]
pub struct RecordingProgress {
    reports: RwLock<Vec<u8>>,
}

impl RecordingProgress {
    pub async fn reports(&self) -> Vec<u8> {
        self.reports.read().await.clone()
    }
}

#[async_trait]
impl ProgressReporter for RecordingProgress {
    async fn report(&self, progress: u8) {
        self.reports.write().await.push(progress);
    }
}

/// 记录状态迁移与进度值的监听器
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<&'static str>>,
    progress: Mutex<Vec<u8>>,
}

impl RecordingListener {
    pub async fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub async fn progress(&self) -> Vec<u8> {
        self.progress.lock().unwrap().clone()
    }

    fn push(&self, event: &'static str) {
        self.events.lock().unwrap().push(event);
    }
}

impl JobListener for RecordingListener {
    fn on_active(&self, _job: &DeletionJob) {
        self.push("active");
    }

    fn on_progress(&self, _job: &DeletionJob, progress: u8) {
        self.progress.lock().unwrap().push(progress);
    }

    fn on_completed(&self, _job: &DeletionJob) {
        self.push("completed");
    }

    fn on_error(&self, _job: &DeletionJob, _error: &CoreError) {
        self.push("error");
    }

    fn on_failed(&self, _job: &DeletionJob, _error: &CoreError) {
        self.push("failed");
    }
}

// ===== RejectingUserRepository =====

/// 读取时表现为空仓库，每次保存都失败
#[derive(Default)]
pub struct RejectingUserRepository;

#[async_trait]
impl UserRepository for RejectingUserRepository {
    async fn find_by_id(&self, _id: &str) -> CoreResult<Option<User>> {
        Ok(None)
    }

    async fn save(&self, user: &User) -> CoreResult<()> {
        Err(CoreError::StorageError(format!(
            "UNIQUE constraint failed while saving {}",
            user.id
        )))
    }

    async fn count_by_domain(&self, _domain: &str) -> CoreResult<u64> {
        Ok(0)
    }
}

// ===== 工厂方法 =====

/// 服务上下文及各 mock 的句柄
pub struct TestContext {
    pub ctx: Arc<ServiceContext>,
    pub users: Arc<InMemoryUserRepository>,
    pub backend: Arc<MockMailBackend>,
    pub resolver: Arc<MockDnsResolver>,
    pub queue: Arc<RecordingJobQueue>,
}

/// 创建测试用 `ServiceContext`
pub fn create_test_context() -> TestContext {
    let users = Arc::new(InMemoryUserRepository::new());
    let backend = Arc::new(MockMailBackend::new());
    let resolver = Arc::new(MockDnsResolver::new());
    let queue = Arc::new(RecordingJobQueue::default());

    let ctx = Arc::new(ServiceContext::new(
        users.clone(),
        backend.clone(),
        resolver.clone(),
        queue.clone(),
    ));

    TestContext {
        ctx,
        users,
        backend,
        resolver,
        queue,
    }
}

/// 持有 `(domain, aliases)` 列表的用户
pub fn user_with_domains(id: &str, domains: &[(&str, &[&str])]) -> User {
    let mut user = User::new(id);
    for (name, aliases) in domains {
        let mut domain = Domain::new(*name);
        domain.aliases = aliases.iter().map(|a| DomainAlias::new(*a)).collect();
        user.domains.push(domain);
    }
    user
}

/// 两个 MX 主机，并拒绝 `+all` 的 SPF 策略
pub fn test_policy() -> DnsPolicy {
    DnsPolicy::new(
        vec![
            MxRecord::new("mx1.mail.example", 10),
            MxRecord::new("mx2.mail.example", 20),
        ],
        "v=spf1 include:_spf.mail.example -all",
        Some(r"\+all"),
    )
    .unwrap()
}
