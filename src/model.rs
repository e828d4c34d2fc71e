use std::fmt;
use std::net::IpAddr;

/// 单个域名的解析结论
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// 无解析记录或查询失败
    NoRecords,
    /// 解析结果命中泛解析IP
    WildcardMatch,
    /// 确认存在，携带首个解析地址
    Confirmed(IpAddr),
}

/// 任务所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Resolving,
    Classified,
}

/// 流水线中流转的任务，同一时刻只被一个阶段持有
#[derive(Debug, Clone)]
pub struct Job {
    pub candidate: String,
    outcome: Option<ResolutionOutcome>,
    resolving: bool,
}

impl Job {
    pub fn new(candidate: String) -> Self {
        Job {
            candidate,
            outcome: None,
            resolving: false,
        }
    }

    pub fn state(&self) -> JobState {
        match (&self.outcome, self.resolving) {
            (Some(_), _) => JobState::Classified,
            (None, true) => JobState::Resolving,
            (None, false) => JobState::Pending,
        }
    }

    pub fn outcome(&self) -> Option<&ResolutionOutcome> {
        self.outcome.as_ref()
    }

    pub(crate) fn begin(&mut self) {
        self.resolving = true;
    }

    pub(crate) fn classify(&mut self, outcome: ResolutionOutcome) {
        self.resolving = false;
        self.outcome = Some(outcome);
    }
}

/// 确认存在的子域名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedHost {
    pub hostname: String,
    pub address: IpAddr,
}

impl fmt::Display for ConfirmedHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.hostname, self.address)
    }
}

/// 一次运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub candidates: usize,
    pub confirmed: usize,
    pub wildcard_matches: usize,
    pub no_records: usize,
}

impl PipelineStats {
    pub(crate) fn record(&mut self, outcome: &ResolutionOutcome) {
        self.candidates += 1;
        match outcome {
            ResolutionOutcome::NoRecords => self.no_records += 1,
            ResolutionOutcome::WildcardMatch => self.wildcard_matches += 1,
            ResolutionOutcome::Confirmed(_) => self.confirmed += 1,
        }
    }
}
