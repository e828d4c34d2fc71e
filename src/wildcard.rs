use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use log::debug;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::dns_resolver::Resolve;
use crate::error::Result;

/// 每个域名发出的随机探测数量
pub const RANDOM_LABEL_COUNT: usize = 4;

/// 泛解析基线：不存在的子域名也会返回的IP集合
///
/// 在流水线启动前计算一次，之后只读，由所有工作协程共享。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WildcardBaseline {
    active: bool,
    addresses: BTreeSet<IpAddr>,
}

impl WildcardBaseline {
    /// 未检测到泛解析
    pub fn inactive() -> Self {
        WildcardBaseline::default()
    }

    /// 以探测得到的地址建立基线，地址自动去重
    pub fn from_addresses<I: IntoIterator<Item = IpAddr>>(addresses: I) -> Self {
        WildcardBaseline {
            active: true,
            addresses: addresses.into_iter().collect(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn addresses(&self) -> &BTreeSet<IpAddr> {
        &self.addresses
    }

    /// 任意一个地址落在基线内即视为泛解析结果
    pub fn matches(&self, ips: &[IpAddr]) -> bool {
        self.active && ips.iter().any(|ip| self.addresses.contains(ip))
    }
}

impl fmt::Display for WildcardBaseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ips: Vec<String> = self.addresses.iter().map(|ip| ip.to_string()).collect();
        write!(f, "[{}]", ips.join(", "))
    }
}

/// 泛解析检测器
pub struct WildcardDetector<R> {
    resolver: Arc<R>,
}

impl<R: Resolve> WildcardDetector<R> {
    pub fn new(resolver: Arc<R>) -> Self {
        WildcardDetector { resolver }
    }

    /// 检测域名是否存在泛解析
    ///
    /// 先生成全部随机标签，随机源失败直接返回错误；
    /// 随后依次解析 `<label>.<domain>`，第一个有地址的探测即作为基线，不再继续。
    pub async fn detect(&self, domain: &str) -> Result<WildcardBaseline> {
        let labels = (0..RANDOM_LABEL_COUNT)
            .map(|_| new_random_label())
            .collect::<Result<Vec<_>>>()?;

        for label in labels {
            let host = format!("{}.{}", label, domain);
            match self.resolver.lookup(&host).await {
                Ok(ips) if !ips.is_empty() => {
                    debug!("wildcard check {} resolved to {:?}", host, ips);
                    return Ok(WildcardBaseline::from_addresses(ips));
                }
                Ok(_) => continue,
                Err(err) => {
                    debug!("wildcard check {} failed: {}", host, err);
                    continue;
                }
            }
        }

        Ok(WildcardBaseline::inactive())
    }
}

/// 生成RFC 4122第4版格式的随机标签，只使用系统安全随机源
pub fn new_random_label() -> Result<String> {
    let mut bytes = [0u8; 16];
    OsRng.try_fill_bytes(&mut bytes)?;

    bytes[8] = bytes[8] & !0xc0 | 0x80;
    bytes[6] = bytes[6] & !0xf0 | 0x40;

    Ok(format!(
        "{}-{}-{}-{}-{}",
        hex(&bytes[0..4]),
        hex(&bytes[4..6]),
        hex(&bytes[6..8]),
        hex(&bytes[8..10]),
        hex(&bytes[10..16])
    ))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns_resolver::LookupError;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedResolver {
        answers: Vec<Vec<IpAddr>>,
        calls: AtomicUsize,
    }

    impl ScriptedResolver {
        fn new(answers: Vec<Vec<IpAddr>>) -> Self {
            ScriptedResolver {
                answers,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Resolve for ScriptedResolver {
        async fn lookup(&self, _host: &str) -> std::result::Result<Vec<IpAddr>, LookupError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.answers.get(n) {
                Some(ips) => Ok(ips.clone()),
                None => Err(LookupError::NoSuchHost),
            }
        }
    }

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn random_label_is_v4_uuid() {
        let label = new_random_label().unwrap();
        let parts: Vec<&str> = label.split('-').collect();
        assert_eq!(
            parts.iter().map(|p| p.len()).collect::<Vec<_>>(),
            vec![8, 4, 4, 4, 12]
        );
        assert!(parts[2].starts_with('4'));
        assert!(matches!(parts[3].chars().next(), Some('8' | '9' | 'a' | 'b')));
        assert!(label.chars().all(|c| c == '-' || (c.is_ascii_hexdigit() && !c.is_ascii_uppercase())));
    }

    #[test]
    fn random_labels_do_not_repeat() {
        let labels: HashSet<String> = (0..64).map(|_| new_random_label().unwrap()).collect();
        assert_eq!(labels.len(), 64);
    }

    #[test]
    fn baseline_matches_any_overlap() {
        let baseline = WildcardBaseline::from_addresses(vec![ip("9.9.9.9"), ip("9.9.9.9")]);
        assert_eq!(baseline.addresses().len(), 1);
        assert!(baseline.matches(&[ip("5.5.5.5"), ip("9.9.9.9")]));
        assert!(!baseline.matches(&[ip("5.5.5.5")]));
        assert_eq!(baseline.to_string(), "[9.9.9.9]");
    }

    #[test]
    fn inactive_baseline_never_matches() {
        let baseline = WildcardBaseline::inactive();
        assert!(!baseline.is_active());
        assert!(!baseline.matches(&[ip("9.9.9.9")]));
    }

    #[tokio::test]
    async fn first_resolving_label_stops_detection() {
        let resolver = Arc::new(ScriptedResolver::new(vec![
            vec![ip("9.9.9.9"), ip("9.9.9.8")],
            vec![ip("1.1.1.1")],
        ]));
        let detector = WildcardDetector::new(resolver.clone());

        let baseline = detector.detect("example.com").await.unwrap();

        assert!(baseline.is_active());
        assert_eq!(baseline.addresses().len(), 2);
        assert!(!baseline.addresses().contains(&ip("1.1.1.1")));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_answers_keep_probing() {
        let resolver = Arc::new(ScriptedResolver::new(vec![vec![], vec![], vec![ip("7.7.7.7")]]));
        let detector = WildcardDetector::new(resolver.clone());

        let baseline = detector.detect("example.com").await.unwrap();

        assert!(baseline.matches(&[ip("7.7.7.7")]));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn no_resolving_label_means_no_wildcard() {
        let resolver = Arc::new(ScriptedResolver::new(Vec::new()));
        let detector = WildcardDetector::new(resolver.clone());

        let baseline = detector.detect("example.com").await.unwrap();

        assert!(!baseline.is_active());
        assert!(baseline.addresses().is_empty());
        assert_eq!(resolver.calls.load(Ordering::SeqCst), RANDOM_LABEL_COUNT);
    }
}
