//! Address resolution and socket sessions
//!
//! This module turns hostnames into candidate addresses and runs one
//! request/response exchange per socket.

pub mod resolver;
pub mod session;

pub use self::resolver::{candidates_from, DnsResolver, Resolve};
pub use self::session::{NetSession, NetTransport, Session, Transport};
