use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Errors raised while decoding a server response
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("incomplete response: expected {expected} bytes, got {actual}")]
    IncompleteResponse { expected: usize, actual: usize },

    #[error("bad format: {0}")]
    BadFormat(String),
}

impl ParseError {
    /// Creates a new bad format error
    pub fn bad_format(msg: impl Into<String>) -> Self {
        ParseError::BadFormat(msg.into())
    }
}

/// Custom error types for timefetch
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("no addresses resolved for {host}")]
    ResolutionEmpty { host: String },

    #[error("failed to create socket for {addr}: {source}")]
    SocketCreateFailed { addr: SocketAddr, source: io::Error },

    #[error("failed to connect to {addr}: {reason}")]
    ConnectFailed { addr: SocketAddr, reason: String },

    #[error("failed to send the whole packet ({written} of {expected} bytes)")]
    PartialWrite { written: usize, expected: usize },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("all {candidates} candidates for {host} exhausted")]
    AllCandidatesExhausted { host: String, candidates: usize },

    #[error("no time protocol selected")]
    Unselected,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Clock error: {0}")]
    Clock(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new connect error
    pub fn connect(addr: SocketAddr, reason: impl ToString) -> Self {
        Error::ConnectFailed {
            addr,
            reason: reason.to_string(),
        }
    }

    /// Creates a new incomplete response error
    pub fn incomplete(expected: usize, actual: usize) -> Self {
        Error::Parse(ParseError::IncompleteResponse { expected, actual })
    }

    /// Creates a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Creates a new clock error
    pub fn clock(msg: impl Into<String>) -> Self {
        Error::Clock(msg.into())
    }
}
