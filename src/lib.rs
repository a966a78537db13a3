//! timefetch: wall-clock time from NTP, RFC 867 Daytime or RFC 868 Time
//!
//! This library resolves a time server, exchanges one request/response with it
//! over the selected protocol and turns the answer into a Unix timestamp. The
//! result can then be written to the system clock.

pub mod core;
pub mod network;
pub mod protocol;
pub mod time;

// Re-export commonly used items
pub use crate::core::{CanonicalTimestamp, Config, Error, ProtocolKind, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
