//! 流水线的三个阶段：生产者读取候选域名，工作协程解析并分类，收集者汇总确认结果。
//!
//! 阶段之间只通过有界队列传递 `Job`，任务所有权随队列转移，不存在共享可变状态。

use std::io;
use std::sync::Arc;

use colored::Colorize;
use log::{debug, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, Mutex};

use crate::dns_resolver::Resolve;
use crate::model::{ConfirmedHost, Job, PipelineStats, ResolutionOutcome};
use crate::wildcard::WildcardBaseline;

/// 所有工作协程共享的任务队列出口
pub type JobQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

/// 逐行读取候选域名并放入任务队列，返回读取的行数
///
/// 行内容原样保留，只去掉 `\n` 或 `\r\n`。无法按UTF-8解码的行直接记为 `NoRecords`，
/// 继续读取后续行。读取出错时返回错误；返回时发送端被释放，队列随之关闭。
pub async fn produce<Rd>(mut reader: Rd, jobs: mpsc::Sender<Job>) -> io::Result<usize>
where
    Rd: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut count = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        if jobs.send(line_job(&buf)).await.is_err() {
            warn!("job queue closed before input was exhausted");
            break;
        }
        count += 1;
    }

    debug!("producer finished, {} candidates queued", count);
    Ok(count)
}

fn line_job(raw: &[u8]) -> Job {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);

    match String::from_utf8(line.to_vec()) {
        Ok(candidate) => Job::new(candidate),
        Err(err) => {
            let mut job = Job::new(String::from_utf8_lossy(err.as_bytes()).into_owned());
            warn!("{:?} is not valid UTF-8, skipped lookup", job.candidate);
            job.classify(ResolutionOutcome::NoRecords);
            job
        }
    }
}

/// 工作协程：从任务队列取任务直到队列关闭且为空
pub async fn consume<R: Resolve>(
    resolver: Arc<R>,
    baseline: Arc<WildcardBaseline>,
    jobs: JobQueue,
    results: mpsc::Sender<Job>,
) {
    loop {
        let next = jobs.lock().await.recv().await;
        let Some(mut job) = next else {
            break;
        };

        if job.outcome().is_none() {
            job.begin();
            let outcome = classify(resolver.as_ref(), &baseline, &job.candidate).await;
            job.classify(outcome);
        }

        if results.send(job).await.is_err() {
            warn!("result queue closed, worker exiting");
            break;
        }
    }
}

/// 解析一个候选域名并给出结论
///
/// 查询失败和空结果都算 `NoRecords`；命中泛解析基线算 `WildcardMatch`；
/// 其余情况以首个地址作为代表结果。
pub async fn classify<R: Resolve>(
    resolver: &R,
    baseline: &WildcardBaseline,
    host: &str,
) -> ResolutionOutcome {
    let ips = match resolver.lookup(host).await {
        Ok(ips) => ips,
        Err(_) => return ResolutionOutcome::NoRecords,
    };

    let Some(first) = ips.first().copied() else {
        return ResolutionOutcome::NoRecords;
    };

    if baseline.matches(&ips) {
        return ResolutionOutcome::WildcardMatch;
    }

    ResolutionOutcome::Confirmed(first)
}

/// 收集者：按到达顺序汇总确认的域名，直到结果队列关闭
pub async fn analyze(
    mut results: mpsc::Receiver<Job>,
    silent: bool,
) -> (Vec<ConfirmedHost>, PipelineStats) {
    let mut confirmed = Vec::new();
    let mut stats = PipelineStats::default();

    while let Some(job) = results.recv().await {
        let Some(outcome) = job.outcome().cloned() else {
            continue;
        };
        stats.record(&outcome);

        if let ResolutionOutcome::Confirmed(address) = outcome {
            let host = ConfirmedHost {
                hostname: job.candidate,
                address,
            };
            if !silent {
                println!("{} {}", "[+]".green(), host);
            }
            confirmed.push(host);
        }
    }

    (confirmed, stats)
}
