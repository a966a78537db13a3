//! Leveled logging sink handed to the acquisition engine
//!
//! The engine never reaches for a global logger; callers pass a [`Logger`] in.

use std::fmt;
use tracing::Level;

/// Sink for leveled, formatted log messages
pub trait Logger: Send + Sync {
    /// Records one message at the given level
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::DEBUG, args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::INFO, args);
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::ERROR, args);
    }
}

/// Forwards messages to `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::ERROR => tracing::error!(target: "timefetch", "{}", args),
            Level::WARN => tracing::warn!(target: "timefetch", "{}", args),
            Level::INFO => tracing::info!(target: "timefetch", "{}", args),
            Level::DEBUG => tracing::debug!(target: "timefetch", "{}", args),
            Level::TRACE => tracing::trace!(target: "timefetch", "{}", args),
        }
    }
}

#[cfg(test)]
pub(crate) use self::memory::MemoryLogger;
