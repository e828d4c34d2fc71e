use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use log::{debug, info};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::{mpsc, Mutex};

use crate::dns_resolver::{DnsResolver, Resolve, ResolverConfig};
use crate::error::{Error, Result};
use crate::handle;
use crate::model::{ConfirmedHost, PipelineStats};
use crate::output::ResultSink;
use crate::wildcard::{WildcardBaseline, WildcardDetector};

/// 默认工作协程数量
pub const DEFAULT_THREADS: usize = 10;

/// 任务队列与结果队列的容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// 解析任务配置
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// 目标域名，只用于泛解析检测，为空时跳过检测
    pub domain: String,
    /// 候选子域名列表，每行一个
    pub input: PathBuf,
    /// 结果输出文件，追加写入
    pub output: PathBuf,
    /// 工作协程数量
    pub threads: usize,
    /// 队列容量
    pub queue_capacity: usize,
    /// DNS服务器配置
    pub resolver: ResolverConfig,
    /// 是否静默模式
    pub silent: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        ResolveConfig {
            domain: String::new(),
            input: PathBuf::new(),
            output: PathBuf::new(),
            threads: DEFAULT_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            resolver: ResolverConfig::default(),
            silent: false,
        }
    }
}

/// 一次运行的结果
#[derive(Debug, Clone)]
pub struct ResolveReport {
    pub baseline: WildcardBaseline,
    /// 按完成顺序排列，不保证与输入顺序一致
    pub confirmed: Vec<ConfirmedHost>,
    pub stats: PipelineStats,
    /// 实际写入输出文件的行数
    pub written: usize,
}

/// 解析引擎
///
/// 持有配置与解析器，泛解析基线在每次运行开始时计算，
/// 之后以只读方式交给所有工作协程。
pub struct ResolveEngine<R> {
    config: ResolveConfig,
    resolver: Arc<R>,
}

impl ResolveEngine<DnsResolver> {
    /// 使用配置中的DNS服务器创建引擎
    pub fn new(config: ResolveConfig) -> Self {
        let resolver = DnsResolver::new(&config.resolver);
        Self::with_resolver(config, resolver)
    }
}

impl<R: Resolve + 'static> ResolveEngine<R> {
    /// 使用自定义解析器创建引擎
    pub fn with_resolver(config: ResolveConfig, resolver: R) -> Self {
        ResolveEngine {
            config,
            resolver: Arc::new(resolver),
        }
    }

    pub fn config(&self) -> &ResolveConfig {
        &self.config
    }

    /// 执行完整流程：打开输入输出、泛解析检测、并发解析、写入结果
    ///
    /// 输入或输出文件打不开时在任何查询发出前返回错误。
    pub async fn run(&self) -> Result<ResolveReport> {
        let input = File::open(&self.config.input)
            .await
            .map_err(|source| Error::Input {
                path: self.config.input.clone(),
                source,
            })?;
        let mut sink = ResultSink::open(&self.config.output).await?;

        let baseline = self.detect_wildcard().await?;
        let (confirmed, stats) = self
            .resolve_stream(BufReader::new(input), baseline.clone())
            .await?;

        let written = sink.append(&confirmed).await;
        info!(
            "{} of {} candidates confirmed, {} wildcard matches, {} lines written to {}",
            stats.confirmed,
            stats.candidates,
            stats.wildcard_matches,
            written,
            sink.path().display()
        );

        Ok(ResolveReport {
            baseline,
            confirmed,
            stats,
            written,
        })
    }

    /// 检测目标域名的泛解析基线
    pub async fn detect_wildcard(&self) -> Result<WildcardBaseline> {
        let domain = self.config.domain.as_str();
        if domain.is_empty() {
            debug!("no target domain, wildcard detection skipped");
            return Ok(WildcardBaseline::inactive());
        }

        let detector = WildcardDetector::new(self.resolver.clone());
        let baseline = detector.detect(domain).await?;
        if baseline.is_active() && !self.config.silent {
            println!(
                "{} Wildcard IPs found at {}. IP(s) {}",
                "[~]".yellow(),
                domain,
                baseline
            );
        }
        Ok(baseline)
    }

    /// 对输入流中的每一行执行解析与分类
    ///
    /// 生产者、N个工作协程与收集者通过两个有界队列连接；
    /// 所有工作协程结束后结果队列才会关闭，收集者随后返回。
    /// 读取输入出错时，已入队的任务处理完毕后返回 `Error::Input`。
    pub async fn resolve_stream<Rd>(
        &self,
        reader: Rd,
        baseline: WildcardBaseline,
    ) -> Result<(Vec<ConfirmedHost>, PipelineStats)>
    where
        Rd: AsyncBufRead + Unpin + Send + 'static,
    {
        let threads = self.config.threads.max(1);
        let capacity = self.config.queue_capacity.max(1);

        let (job_tx, job_rx) = mpsc::channel(capacity);
        let (result_tx, result_rx) = mpsc::channel(capacity);
        let job_rx: handle::JobQueue = Arc::new(Mutex::new(job_rx));
        let baseline = Arc::new(baseline);

        let mut workers = Vec::with_capacity(threads);
        for _ in 0..threads {
            workers.push(tokio::spawn(handle::consume(
                self.resolver.clone(),
                baseline.clone(),
                job_rx.clone(),
                result_tx.clone(),
            )));
        }
        drop(result_tx);
        debug!("started {} workers, queue capacity {}", threads, capacity);

        let producer = tokio::spawn(handle::produce(reader, job_tx));
        let collector = tokio::spawn(handle::analyze(result_rx, self.config.silent));

        let read = producer.await?;
        for worker in workers {
            worker.await?;
        }
        let (confirmed, stats) = collector.await?;
        let read = read.map_err(|source| Error::Input {
            path: self.config.input.clone(),
            source,
        })?;
        debug!("{} candidates read, {} classified", read, stats.candidates);

        Ok((confirmed, stats))
    }
}

/// 便捷的解析函数，使用默认DNS服务器
pub async fn resolve_subdomains(
    domain: impl Into<String>,
    input: impl Into<PathBuf>,
    output: impl Into<PathBuf>,
) -> Result<ResolveReport> {
    let config = ResolveConfig {
        domain: domain.into(),
        input: input.into(),
        output: output.into(),
        ..Default::default()
    };

    ResolveEngine::new(config).run().await
}
