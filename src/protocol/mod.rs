//! Wire codecs for the supported time protocols
//!
//! Each protocol has its own codec module translating between raw buffers
//! and a Unix timestamp. [`TimeProtocol`] ties a codec to its port and
//! transport so the acquisition loop can be written once over
//! [`ProtocolKind`].

pub mod daytime;
pub mod ntp;
pub mod rfc868;

pub use self::daytime::DaytimeCodec;
pub use self::ntp::{NtpCodec, NtpPacket};
pub use self::rfc868::TimeCodec;

use crate::core::{Logger, ParseError, ProtocolKind, TransportKind, EPOCH_DELTA};

/// NTP server port
pub const NTP_PORT: u16 = 123;

/// RFC 867 daytime port
pub const DAYTIME_PORT: u16 = 13;

/// RFC 868 time port
pub const TIME_PORT: u16 = 37;

/// Capabilities the acquisition loop needs from a protocol
pub trait TimeProtocol {
    /// Request payload sent to the server
    fn build_request(&self) -> Vec<u8>;

    /// Decodes a received buffer into Unix seconds
    fn parse_response(&self, buf: &[u8]) -> Result<i64, ParseError>;

    /// Well-known server port
    fn port(&self) -> u16;

    /// Transport used for the exchange
    fn transport_kind(&self) -> TransportKind;

    /// Number of bytes to wait for in a response
    fn response_size(&self) -> usize;

    /// Whether a short but non-empty response is passed on to the decoder
    fn accepts_partial(&self) -> bool {
        false
    }

    /// Attempts made against one candidate before advancing
    fn attempts_per_candidate(&self, _retries: u32) -> u32 {
        1
    }

    /// Logs a received response before it is decoded
    fn describe_response(&self, _buf: &[u8], _log: &dyn Logger) {}
}

impl TimeProtocol for ProtocolKind {
    fn build_request(&self) -> Vec<u8> {
        match self {
            ProtocolKind::Ntp => NtpCodec::encode_request().to_vec(),
            ProtocolKind::Daytime => DaytimeCodec::encode_request().to_vec(),
            ProtocolKind::Time => TimeCodec::encode_request().to_vec(),
        }
    }

    fn parse_response(&self, buf: &[u8]) -> Result<i64, ParseError> {
        match self {
            ProtocolKind::Ntp => NtpCodec::decode_response(buf),
            ProtocolKind::Daytime => DaytimeCodec::decode_response(buf),
            ProtocolKind::Time => TimeCodec::decode_response(buf),
        }
    }

    fn port(&self) -> u16 {
        match self {
            ProtocolKind::Ntp => NTP_PORT,
            ProtocolKind::Daytime => DAYTIME_PORT,
            ProtocolKind::Time => TIME_PORT,
        }
    }

    fn transport_kind(&self) -> TransportKind {
        match self {
            ProtocolKind::Ntp => TransportKind::Datagram,
            ProtocolKind::Daytime | ProtocolKind::Time => TransportKind::Stream,
        }
    }

    fn response_size(&self) -> usize {
        match self {
            ProtocolKind::Ntp => NtpPacket::SIZE,
            ProtocolKind::Daytime => DaytimeCodec::MAX_RESPONSE,
            ProtocolKind::Time => TimeCodec::RESPONSE_SIZE,
        }
    }

    fn accepts_partial(&self) -> bool {
        matches!(self, ProtocolKind::Daytime)
    }

    fn attempts_per_candidate(&self, retries: u32) -> u32 {
        match self {
            // Open, send and receive repeat against the same server
            ProtocolKind::Time => retries.max(1),
            ProtocolKind::Ntp | ProtocolKind::Daytime => 1,
        }
    }

    fn describe_response(&self, buf: &[u8], log: &dyn Logger) {
        if let ProtocolKind::Daytime = self {
            log.info(format_args!("Time String: {}", DaytimeCodec::clean(buf)));
        }
    }
}

/// Converts seconds since 1900-01-01 into seconds since 1970-01-01
pub fn from_ntp_seconds(secs: u32) -> i64 {
    i64::from(secs) - EPOCH_DELTA as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_conversion() {
        assert_eq!(from_ntp_seconds(2_208_988_800), 0);
        assert_eq!(from_ntp_seconds(3_919_487_430), 1_710_498_630);
        assert_eq!(from_ntp_seconds(0), -2_208_988_800);
    }

    #[test]
    fn test_protocol_capabilities() {
        assert_eq!(ProtocolKind::Ntp.port(), 123);
        assert_eq!(ProtocolKind::Daytime.port(), 13);
        assert_eq!(ProtocolKind::Time.port(), 37);

        assert_eq!(ProtocolKind::Ntp.transport_kind(), TransportKind::Datagram);
        assert_eq!(ProtocolKind::Daytime.transport_kind(), TransportKind::Stream);
        assert_eq!(ProtocolKind::Time.transport_kind(), TransportKind::Stream);

        assert_eq!(ProtocolKind::Ntp.build_request().len(), 48);
        assert_eq!(ProtocolKind::Daytime.build_request(), vec![0]);
        assert_eq!(ProtocolKind::Time.build_request(), vec![0; 4]);
    }

    #[test]
    fn test_attempts_per_candidate() {
        assert_eq!(ProtocolKind::Ntp.attempts_per_candidate(20), 1);
        assert_eq!(ProtocolKind::Daytime.attempts_per_candidate(20), 1);
        assert_eq!(ProtocolKind::Time.attempts_per_candidate(5), 5);
        assert_eq!(ProtocolKind::Time.attempts_per_candidate(0), 1);
    }

    #[test]
    fn test_describe_response() {
        use crate::core::log::MemoryLogger;
        use tracing::Level;

        let log = MemoryLogger::default();
        ProtocolKind::Ntp.describe_response(&[0u8; 48], &log);
        ProtocolKind::Time.describe_response(&[0u8; 4], &log);
        assert!(log.entries().is_empty());

        ProtocolKind::Daytime.describe_response(b"\n60384 24-03-15 10:20:30\r\n", &log);
        assert_eq!(
            log.entries(),
            vec![(Level::INFO, "Time String: 60384 24-03-15 10:20:30".to_string())]
        );
    }

    #[test]
    fn test_partial_responses() {
        assert!(ProtocolKind::Daytime.accepts_partial());
        assert!(!ProtocolKind::Ntp.accepts_partial());
        assert!(!ProtocolKind::Time.accepts_partial());
    }
}
