//! Time acquisition and clock setting
//!
//! This module fetches the current time from a remote authority over one of
//! three protocols and can apply it to the local clock:
//!
//! - NTP client query over UDP port 123
//! - RFC 867 daytime over TCP port 13
//! - RFC 868 time over TCP port 37
//!
//! Acquisition runs in a fixed order:
//!
//! 1. The configured host is resolved into candidate addresses
//! 2. Candidates are tried one at a time in resolver order
//! 3. The first response that decodes wins; failures move on to the next
//!    attempt or candidate
//! 4. If nothing answers the result is [`CanonicalTimestamp::FAILED`]
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use timefetch::core::{Config, ProtocolKind, TracingLogger};
//! use timefetch::network::{DnsResolver, NetTransport};
//! use timefetch::time::acquire_time;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let resolver = DnsResolver::from_system_conf().unwrap();
//!     let ts = acquire_time(
//!         Some(ProtocolKind::Ntp),
//!         &config,
//!         resolver,
//!         NetTransport::default(),
//!         Arc::new(TracingLogger),
//!     )
//!     .await
//!     .unwrap();
//!     println!("{}", ts);
//! }
//! ```
//!
//! [`CanonicalTimestamp::FAILED`]: crate::core::CanonicalTimestamp::FAILED

pub mod acquire;
pub mod clock;
pub mod selector;

pub use self::acquire::{Acquisition, Orchestrator};
pub use self::clock::{sync_clock, SetClock, SystemClock};
pub use self::selector::acquire_time;
