use std::path::{Path, PathBuf};

use log::warn;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{Error, Result};
use crate::model::ConfirmedHost;

/// 结果输出文件，追加写入，已有内容保留
pub struct ResultSink {
    path: PathBuf,
    file: BufWriter<File>,
}

impl ResultSink {
    /// 打开输出文件，不存在时创建
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(0o600);

        let file = options.open(&path).await.map_err(|source| Error::Output {
            path: path.clone(),
            source,
        })?;
        Ok(ResultSink {
            path,
            file: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 逐行写入域名并刷新，返回写入的行数
    ///
    /// 写入失败时放弃剩余内容，不回滚已写入的行；刷新失败时返回0。
    pub async fn append(&mut self, hosts: &[ConfirmedHost]) -> usize {
        let mut written = 0;
        for host in hosts {
            let line = format!("{}\n", host.hostname);
            if let Err(err) = self.file.write_all(line.as_bytes()).await {
                warn!(
                    "write to {} failed after {} lines: {}",
                    self.path.display(),
                    written,
                    err
                );
                break;
            }
            written += 1;
        }

        if let Err(err) = self.file.flush().await {
            warn!("flush of {} failed: {}", self.path.display(), err);
            return 0;
        }
        written
    }
}
