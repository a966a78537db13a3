//! Core types and traits for timefetch
//!
//! This module contains the fundamental building blocks used throughout the library.

pub mod error;
pub mod log;
pub mod serde;
pub mod types;

pub use self::error::{Error, ParseError, Result};
pub use self::log::{Logger, TracingLogger};
pub use self::types::{
    AddressFamily,
    AddressHints,
    CandidateAddress,
    CanonicalTimestamp,
    Config,
    ProtocolKind,
    RetryPolicy,
    SocketType,
    TransportKind,
    TransportProtocol,
};

/// Seconds between 1900-01-01 and 1970-01-01
pub const EPOCH_DELTA: u64 = 2_208_988_800;

/// Retry count used when none is configured
pub const DEFAULT_RETRIES: u32 = 20;

/// IP time-to-live applied to every socket
pub const DEFAULT_TTL: u32 = 56;

/// Default NTP server
pub const DEFAULT_NTP_HOST: &str = "time-a-wwv.nist.gov";

/// Default daytime and time protocol server
pub const DEFAULT_STREAM_HOST: &str = "time.nist.gov";
