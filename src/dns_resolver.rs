use std::future::Future;
use std::net::{IpAddr, SocketAddr};

use log::debug;
use thiserror::Error;
use trust_dns_resolver::config::{
    LookupIpStrategy, NameServerConfigGroup, ResolverConfig as UpstreamConfig, ResolverOpts,
};
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::TokioAsyncResolver;

use crate::error::{Error, Result};

/// 未指定DNS服务器时使用的公共解析器
pub const DEFAULT_RESOLVERS: [&str; 3] = ["1.1.1.1", "8.8.8.8", "8.8.4.4"];

/// 单次查询失败前的重试次数
pub const DEFAULT_RETRIES: usize = 5;

const DNS_PORT: u16 = 53;

/// 单次查询失败的原因，调用方统一视为“无结果”
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no such host")]
    NoSuchHost,
    #[error("lookup timed out")]
    Timeout,
    #[error("dns error: {0}")]
    Other(String),
}

impl From<ResolveError> for LookupError {
    fn from(err: ResolveError) -> Self {
        match err.kind() {
            ResolveErrorKind::NoRecordsFound { .. } => LookupError::NoSuchHost,
            ResolveErrorKind::Timeout => LookupError::Timeout,
            _ => LookupError::Other(err.to_string()),
        }
    }
}

/// 地址查询能力
///
/// 工作协程与泛解析检测器只依赖这个接口，测试中可以换成内存实现。
pub trait Resolve: Send + Sync {
    /// 查询主机的地址记录，按服务器返回的顺序给出
    fn lookup(
        &self,
        host: &str,
    ) -> impl Future<Output = std::result::Result<Vec<IpAddr>, LookupError>> + Send;
}

/// DNS服务器列表与重试次数，构造后只读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub endpoints: Vec<SocketAddr>,
    pub retries: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let endpoints = DEFAULT_RESOLVERS
            .iter()
            .filter_map(|addr| parse_endpoint(addr).ok())
            .collect();
        ResolverConfig {
            endpoints,
            retries: DEFAULT_RETRIES,
        }
    }
}

impl ResolverConfig {
    /// 从地址字符串构造，空列表时回退到默认服务器
    pub fn from_addresses<S: AsRef<str>>(addresses: &[S]) -> Result<Self> {
        let endpoints = addresses
            .iter()
            .map(AsRef::as_ref)
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(parse_endpoint)
            .collect::<Result<Vec<_>>>()?;

        if endpoints.is_empty() {
            return Ok(ResolverConfig::default());
        }

        Ok(ResolverConfig {
            endpoints,
            retries: DEFAULT_RETRIES,
        })
    }
}

/// 解析 `ip` 或 `ip:port` 形式的服务器地址
pub fn parse_endpoint(addr: &str) -> Result<SocketAddr> {
    let addr = addr.trim();
    if let Ok(socket) = addr.parse::<SocketAddr>() {
        return Ok(socket);
    }
    addr.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, DNS_PORT))
        .map_err(|_| Error::InvalidResolver(addr.to_string()))
}

/// 基于trust-dns的解析器
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        let mut group = NameServerConfigGroup::new();
        for endpoint in &config.endpoints {
            group.merge(NameServerConfigGroup::from_ips_clear(
                &[endpoint.ip()],
                endpoint.port(),
                true,
            ));
        }

        let upstream = UpstreamConfig::from_parts(None, vec![], group);
        DnsResolver {
            resolver: TokioAsyncResolver::tokio(upstream, resolver_opts(config)),
        }
    }
}

/// 只查A记录，不读本地hosts文件，不缓存
fn resolver_opts(config: &ResolverConfig) -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.attempts = config.retries;
    opts.ip_strategy = LookupIpStrategy::Ipv4Only;
    opts.cache_size = 0;
    opts.use_hosts_file = false;
    opts
}

impl Resolve for DnsResolver {
    async fn lookup(&self, host: &str) -> std::result::Result<Vec<IpAddr>, LookupError> {
        // IP字面量不会发出查询，视为不存在
        if host.is_empty() || host.parse::<IpAddr>().is_ok() {
            return Err(LookupError::NoSuchHost);
        }

        match self.resolver.lookup_ip(host).await {
            Ok(response) => Ok(response.iter().collect()),
            Err(err) => {
                let err = LookupError::from(err);
                debug!("lookup {} failed: {}", host, err);
                Err(err)
            }
        }
    }
}
