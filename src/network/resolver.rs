use std::net::IpAddr;

use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

use crate::core::{AddressHints, CandidateAddress, Error, Logger, Result};

/// Turns a hostname into an ordered list of candidates
///
/// Resolution failures and empty answers look the same to the caller: an
/// empty list. Implementations may log the difference.
#[allow(async_fn_in_trait)]
pub trait Resolve {
    async fn resolve(&self, host: &str, hints: AddressHints, log: &dyn Logger)
        -> Vec<CandidateAddress>;
}

/// DNS backed resolver
pub struct DnsResolver {
    inner: TokioAsyncResolver,
}

impl DnsResolver {
    /// Creates a resolver from the host's resolver configuration
    pub fn from_system_conf() -> Result<Self> {
        let inner = TokioAsyncResolver::tokio_from_system_conf()
            .map_err(|e| Error::config(format!("Failed to load resolver configuration: {}", e)))?;
        Ok(DnsResolver { inner })
    }

    /// Creates a resolver with explicit settings
    pub fn new(config: ResolverConfig, opts: ResolverOpts) -> Result<Self> {
        let inner = TokioAsyncResolver::tokio(config, opts)
            .map_err(|e| Error::config(format!("Failed to create resolver: {}", e)))?;
        Ok(DnsResolver { inner })
    }
}

impl Resolve for DnsResolver {
    async fn resolve(
        &self,
        host: &str,
        hints: AddressHints,
        log: &dyn Logger,
    ) -> Vec<CandidateAddress> {
        match self.inner.lookup_ip(host).await {
            Ok(lookup) => candidates_from(lookup.iter(), hints),
            Err(e) => {
                log.error(format_args!("failed to resolve {}: {}", host, e));
                Vec::new()
            }
        }
    }
}

/// Keeps addresses of the requested family, in order, stamped with `hints`
pub fn candidates_from(
    ips: impl IntoIterator<Item = IpAddr>,
    hints: AddressHints,
) -> Vec<CandidateAddress> {
    ips.into_iter()
        .filter(|ip| hints.family.matches(ip))
        .map(|ip| CandidateAddress::new(ip, hints))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log::MemoryLogger;
    use crate::core::{AddressFamily, SocketType, TransportKind};

    #[test]
    fn test_candidates_keep_order_and_family() {
        let ips: Vec<IpAddr> = ["132.163.97.1", "2610:20:6f97:97::4", "132.163.96.1"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();

        let hints = AddressHints::inet(TransportKind::Datagram);
        let candidates = candidates_from(ips, hints);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].ip.to_string(), "132.163.97.1");
        assert_eq!(candidates[1].ip.to_string(), "132.163.96.1");
        assert!(candidates.iter().all(|c| c.family == AddressFamily::Inet));
        assert!(candidates.iter().all(|c| c.socket_type == SocketType::Datagram));
    }

    #[test]
    fn test_candidates_empty() {
        let hints = AddressHints::inet(TransportKind::Stream);
        let only_v6: Vec<IpAddr> = vec!["::1".parse().unwrap()];
        assert!(candidates_from(only_v6, hints).is_empty());
        assert!(candidates_from(Vec::new(), hints).is_empty());
    }

    #[tokio::test]
    async fn test_dns_resolver_ip_literal() {
        let resolver = DnsResolver::new(ResolverConfig::default(), ResolverOpts::default()).unwrap();
        let log = MemoryLogger::default();
        let hints = AddressHints::inet(TransportKind::Stream);

        let candidates = resolver.resolve("127.0.0.1", hints, &log).await;
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].socket_addr(13).to_string(), "127.0.0.1:13");
    }
}
