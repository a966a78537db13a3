use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Error;

/// Address family requested from the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressFamily {
    /// IPv4
    Inet,
    /// IPv6
    Inet6,
}

impl AddressFamily {
    /// Returns whether the address belongs to this family
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::Inet => ip.is_ipv4(),
            AddressFamily::Inet6 => ip.is_ipv6(),
        }
    }
}

/// Socket type of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocketType {
    Datagram,
    Stream,
}

/// Transport protocol of a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportProtocol {
    Udp,
    Tcp,
}

/// How a time protocol travels on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportKind {
    /// Connectionless UDP exchange
    Datagram,
    /// Connected TCP exchange
    Stream,
}

impl TransportKind {
    /// Socket type used by this transport
    pub fn socket_type(&self) -> SocketType {
        match self {
            TransportKind::Datagram => SocketType::Datagram,
            TransportKind::Stream => SocketType::Stream,
        }
    }

    /// Transport protocol used by this transport
    pub fn protocol(&self) -> TransportProtocol {
        match self {
            TransportKind::Datagram => TransportProtocol::Udp,
            TransportKind::Stream => TransportProtocol::Tcp,
        }
    }
}

/// Family/socket-type/transport triple passed to the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressHints {
    pub family: AddressFamily,
    pub socket_type: SocketType,
    pub protocol: TransportProtocol,
}

impl AddressHints {
    /// Creates hints for an IPv4 lookup over the given transport
    pub fn inet(kind: TransportKind) -> Self {
        AddressHints {
            family: AddressFamily::Inet,
            socket_type: kind.socket_type(),
            protocol: kind.protocol(),
        }
    }
}

/// One resolved endpoint considered for an exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateAddress {
    pub family: AddressFamily,
    pub socket_type: SocketType,
    pub protocol: TransportProtocol,
    pub ip: IpAddr,
}

impl CandidateAddress {
    /// Creates a candidate for `ip` carrying the given hints
    pub fn new(ip: IpAddr, hints: AddressHints) -> Self {
        CandidateAddress {
            family: hints.family,
            socket_type: hints.socket_type,
            protocol: hints.protocol,
            ip,
        }
    }

    /// Socket address of this candidate on `port`
    pub fn socket_addr(&self, port: u16) -> SocketAddr {
        SocketAddr::new(self.ip, port)
    }
}

/// Seconds since the Unix epoch, with `0` reserved for failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalTimestamp(pub i64);

impl CanonicalTimestamp {
    /// Sentinel for a failed acquisition
    pub const FAILED: CanonicalTimestamp = CanonicalTimestamp(0);

    pub fn is_failure(&self) -> bool {
        self.0 == 0
    }

    pub fn secs(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CanonicalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Selects one of the three supported time protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    /// Network Time Protocol, client query mode
    Ntp,
    /// RFC 867 Daytime
    Daytime,
    /// RFC 868 Time
    Time,
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProtocolKind::Ntp => "network time protocol",
            ProtocolKind::Daytime => "daytime protocol",
            ProtocolKind::Time => "time protocol",
        };
        f.write_str(name)
    }
}

impl FromStr for ProtocolKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ntp" => Ok(ProtocolKind::Ntp),
            "daytime" => Ok(ProtocolKind::Daytime),
            "time" => Ok(ProtocolKind::Time),
            other => Err(Error::config(format!("unknown protocol `{}`", other))),
        }
    }
}

/// Retry count and per-attempt timeout for one protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    count: u32,
    timeout: Duration,
}

impl RetryPolicy {
    /// Retry count used when none is configured
    pub const DEFAULT_COUNT: u32 = super::DEFAULT_RETRIES;

    /// Creates a policy; a zero count falls back to the default
    pub fn new(count: u32, timeout: Duration) -> Self {
        let count = if count == 0 { Self::DEFAULT_COUNT } else { count };
        RetryPolicy { count, timeout }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Configuration for one acquisition run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Protocol to use; `None` leaves the selection unresolved
    pub protocol: Option<ProtocolKind>,
    /// Host queried over NTP
    pub ntp_host: String,
    /// Host queried over daytime and time protocols
    pub stream_host: String,
    /// Retry count, zero means the default
    pub retries: u32,
    /// Receive timeout for NTP
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub ntp_timeout: Duration,
    /// Connect and receive timeout for daytime
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub daytime_timeout: Duration,
    /// Connect and receive timeout for the time protocol
    #[serde(serialize_with = "super::serde::serialize_duration")]
    #[serde(deserialize_with = "super::serde::deserialize_duration")]
    pub time_timeout: Duration,
    /// Commit the acquired time to the system clock
    pub sync_clock: bool,
}

impl Config {
    /// Host queried by the given protocol
    pub fn host_for(&self, kind: ProtocolKind) -> &str {
        match kind {
            ProtocolKind::Ntp => &self.ntp_host,
            ProtocolKind::Daytime | ProtocolKind::Time => &self.stream_host,
        }
    }

    /// Retry policy applied to the given protocol
    pub fn retry_policy(&self, kind: ProtocolKind) -> RetryPolicy {
        let timeout = match kind {
            ProtocolKind::Ntp => self.ntp_timeout,
            ProtocolKind::Daytime => self.daytime_timeout,
            ProtocolKind::Time => self.time_timeout,
        };
        RetryPolicy::new(self.retries, timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            protocol: Some(ProtocolKind::Ntp),
            ntp_host: super::DEFAULT_NTP_HOST.to_string(),
            stream_host: super::DEFAULT_STREAM_HOST.to_string(),
            retries: super::DEFAULT_RETRIES,
            ntp_timeout: Duration::from_secs(1),
            daytime_timeout: Duration::from_secs(3),
            time_timeout: Duration::from_secs(1),
            sync_clock: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_retry_policy_default_count() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.count(), 20);

        let policy = RetryPolicy::new(3, Duration::from_millis(250));
        assert_eq!(policy.count(), 3);
        assert_eq!(policy.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_candidate_from_hints() {
        let hints = AddressHints::inet(TransportKind::Stream);
        let ip = IpAddr::V4(Ipv4Addr::new(129, 6, 15, 28));
        let candidate = CandidateAddress::new(ip, hints);

        assert_eq!(candidate.family, AddressFamily::Inet);
        assert_eq!(candidate.socket_type, SocketType::Stream);
        assert_eq!(candidate.protocol, TransportProtocol::Tcp);
        assert_eq!(candidate.socket_addr(37).to_string(), "129.6.15.28:37");
    }

    #[test]
    fn test_family_matching() {
        let v4: IpAddr = "10.0.0.1".parse().unwrap();
        let v6: IpAddr = "::1".parse().unwrap();
        assert!(AddressFamily::Inet.matches(&v4));
        assert!(!AddressFamily::Inet.matches(&v6));
        assert!(AddressFamily::Inet6.matches(&v6));
    }

    #[test]
    fn test_protocol_from_str() {
        assert_eq!("NTP".parse::<ProtocolKind>().unwrap(), ProtocolKind::Ntp);
        assert_eq!("daytime".parse::<ProtocolKind>().unwrap(), ProtocolKind::Daytime);
        assert!(matches!("sntp".parse::<ProtocolKind>(), Err(Error::Config(_))));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.protocol, Some(ProtocolKind::Ntp));
        assert_eq!(config.host_for(ProtocolKind::Ntp), "time-a-wwv.nist.gov");
        assert_eq!(config.host_for(ProtocolKind::Time), "time.nist.gov");
        assert_eq!(config.retry_policy(ProtocolKind::Ntp).timeout(), Duration::from_secs(1));
        assert!(!config.sync_clock);
    }

    #[test]
    fn test_config_from_json() {
        let config: Config = serde_json::from_str(
            r#"{"protocol":"time","retries":0,"time_timeout":0.5,"stream_host":"localhost"}"#,
        )
        .unwrap();

        assert_eq!(config.protocol, Some(ProtocolKind::Time));
        assert_eq!(config.host_for(ProtocolKind::Daytime), "localhost");
        let policy = config.retry_policy(ProtocolKind::Time);
        assert_eq!(policy.count(), 20);
        assert_eq!(policy.timeout(), Duration::from_millis(500));
        // Unspecified fields keep their defaults
        assert_eq!(config.ntp_host, "time-a-wwv.nist.gov");
    }

    #[test]
    fn test_canonical_timestamp_sentinel() {
        assert!(CanonicalTimestamp::FAILED.is_failure());
        assert!(!CanonicalTimestamp(1_710_498_030).is_failure());
        assert_eq!(CanonicalTimestamp(42).to_string(), "42");
    }
}
