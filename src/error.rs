use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 致命错误：出现即终止整个运行
#[derive(Debug, Error)]
pub enum Error {
    #[error("No Input file specified !")]
    MissingInput,

    #[error("No Output file specified !")]
    MissingOutput,

    /// 无法打开待解析的子域名列表
    #[error("cannot open input file {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 无法打开结果输出文件
    #[error("cannot open output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// 无法读取DNS服务器列表文件
    #[error("cannot read resolver list {path}: {source}")]
    ResolverList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// DNS服务器地址格式错误
    #[error("invalid resolver address: {0:?}")]
    InvalidResolver(String),

    /// 系统随机源不可用
    #[error("secure random source failed: {0}")]
    Entropy(#[from] rand::Error),

    /// 流水线任务异常退出
    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;
