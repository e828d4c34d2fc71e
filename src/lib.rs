//! # rsubresolve
//!
//! 对子域名列表做实时DNS解析，剔除无法解析的条目以及仅因泛解析而“存在”的条目。
//!
//! ## 特性
//!
//! - 🚀 **并发解析**: 固定数量的工作协程共享有界队列，内存占用与输入规模无关
//! - 🔍 **泛解析过滤**: 先用随机子域名探测目标域名，命中基线IP的结果直接丢弃
//! - 🌐 **自定义DNS**: 支持逗号分隔列表、文件列表或内置公共DNS
//!
//! ## 快速开始
//!
//! ```rust,no_run
//! use rsubresolve::resolve_subdomains;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = resolve_subdomains("example.com", "subs.txt", "resolved.txt").await?;
//!
//!     println!("确认 {} 个子域名", report.confirmed.len());
//!     for host in report.confirmed.iter().take(5) {
//!         println!("  {} -> {}", host.hostname, host.address);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## 高级配置
//!
//! ```rust,no_run
//! use rsubresolve::{ResolveConfig, ResolveEngine, ResolverConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResolveConfig {
//!         domain: "example.com".to_string(),
//!         input: "subs.txt".into(),
//!         output: "resolved.txt".into(),
//!         threads: 50,
//!         resolver: ResolverConfig::from_addresses(&["9.9.9.9", "1.1.1.1"])?,
//!         silent: true,
//!         ..Default::default()
//!     };
//!
//!     let report = ResolveEngine::new(config).run().await?;
//!     println!("泛解析: {}", report.baseline.is_active());
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod api;
pub mod dns_resolver;
pub mod error;
pub mod handle;
pub mod input;
pub mod logger;
pub mod model;
pub mod output;
pub mod wildcard;

// 重新导出主要的公共API
pub use api::{resolve_subdomains, ResolveConfig, ResolveEngine, ResolveReport};
pub use dns_resolver::{DnsResolver, LookupError, Resolve, ResolverConfig};
pub use error::{Error, Result};
pub use model::{ConfirmedHost, Job, JobState, PipelineStats, ResolutionOutcome};
pub use output::ResultSink;
pub use wildcard::{WildcardBaseline, WildcardDetector};
