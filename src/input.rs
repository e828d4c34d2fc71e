use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use crate::api::{ResolveConfig, DEFAULT_THREADS};
use crate::dns_resolver::ResolverConfig;
use crate::error::{Error, Result};

/// 只有单横线形式的多字母参数
const MULTI_LETTER_FLAGS: [&str; 1] = ["rL"];

#[derive(Parser, Debug)]
#[command(name = "rsubresolve")]
#[command(author = "o0x1024")]
#[command(version)]
#[command(about = "Resolve a subdomain list and drop wildcard false positives", long_about = None)]
pub struct Opts {
    /// domain to check for wildcard DNS
    #[arg(short = 'd', default_value = "")]
    pub domain: String,

    /// file to resolve subdomains from, one per line
    #[arg(short = 'l')]
    pub list: Option<PathBuf>,

    /// file to append resolved subdomains to
    #[arg(short = 'o')]
    pub output: Option<PathBuf>,

    /// number of concurrent workers
    #[arg(short = 't', default_value_t = DEFAULT_THREADS)]
    pub threads: usize,

    /// comma-separated list of resolvers to use
    #[arg(short = 'r')]
    pub resolvers: Option<String>,

    /// file containing list of resolvers to use
    #[arg(long = "rL")]
    pub resolver_list: Option<PathBuf>,

    /// suppress banner and progress lines
    #[arg(short = 's', long)]
    pub silent: bool,

    /// verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Opts {
    /// 解析命令行，兼容 `-rL` 这类单横线多字母参数
    pub fn parse_compat<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Opts::parse_from(normalize_args(args))
    }

    /// 校验必填参数并生成运行配置
    pub fn to_config(&self) -> Result<ResolveConfig> {
        let input = self.list.clone().ok_or(Error::MissingInput)?;
        let output = self.output.clone().ok_or(Error::MissingOutput)?;
        let resolver = load_resolvers(self.resolvers.as_deref(), self.resolver_list.as_deref())?;

        Ok(ResolveConfig {
            domain: self.domain.clone(),
            input,
            output,
            threads: self.threads,
            resolver,
            silent: self.silent,
            ..Default::default()
        })
    }
}

/// 把 `-rL` 改写为 `--rL`，其余参数原样保留
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| long_form(&arg).unwrap_or(arg))
        .collect()
}

fn long_form(arg: &OsString) -> Option<OsString> {
    let text = arg.to_str()?;
    let flag = text.strip_prefix('-')?;
    if flag.starts_with('-') {
        return None;
    }
    let name = flag.split('=').next().unwrap_or(flag);
    MULTI_LETTER_FLAGS
        .contains(&name)
        .then(|| OsString::from(format!("-{}", text)))
}

/// 选择DNS服务器：优先 `-r` 列表，其次 `-rL` 文件，最后使用内置默认值
pub fn load_resolvers(comma: Option<&str>, list: Option<&Path>) -> Result<ResolverConfig> {
    if let Some(comma) = comma.filter(|s| !s.trim().is_empty()) {
        let addresses: Vec<&str> = comma.split(',').collect();
        return ResolverConfig::from_addresses(&addresses);
    }

    if let Some(path) = list {
        let content = fs::read_to_string(path).map_err(|source| Error::ResolverList {
            path: path.to_path_buf(),
            source,
        })?;
        let addresses: Vec<&str> = content.lines().collect();
        return ResolverConfig::from_addresses(&addresses);
    }

    Ok(ResolverConfig::default())
}
