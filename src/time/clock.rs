//! Committing an acquired time to the system clock

use chrono::{Local, TimeZone};

use crate::core::{CanonicalTimestamp, Error, Logger, Result};

/// Sets the system clock to a Unix timestamp
pub trait SetClock {
    fn set_time(&self, secs: i64) -> Result<()>;
}

/// The host's realtime clock
///
/// Needs root or `CAP_SYS_TIME`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SetClock for SystemClock {
    #[cfg(target_os = "linux")]
    fn set_time(&self, secs: i64) -> Result<()> {
        use nix::sys::time::TimeSpec;
        use nix::time::{clock_settime, ClockId};

        let ts = TimeSpec::new(secs as nix::libc::time_t, 0);
        clock_settime(ClockId::CLOCK_REALTIME, ts)
            .map_err(|e| Error::clock(format!("clock_settime failed: {}", e)))
    }

    #[cfg(not(target_os = "linux"))]
    fn set_time(&self, _secs: i64) -> Result<()> {
        Err(Error::clock("setting the clock is not supported on this platform"))
    }
}

/// Applies `ts` to `clock`, logging the outcome
///
/// A failed acquisition is never applied.
pub fn sync_clock(clock: &impl SetClock, ts: CanonicalTimestamp, log: &dyn Logger) -> Result<()> {
    if ts.is_failure() {
        return Err(Error::clock("refusing to apply a failed acquisition"));
    }

    match clock.set_time(ts.secs()) {
        Ok(()) => {
            let shown = Local
                .timestamp_opt(ts.secs(), 0)
                .single()
                .map(|t| t.to_rfc2822())
                .unwrap_or_else(|| ts.to_string());
            log.info(format_args!("successfully synced internet time {}", shown));
            Ok(())
        }
        Err(e) => {
            log.error(format_args!("failed to sync device time: {}", e));
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log::MemoryLogger;
    use std::cell::RefCell;
    use tracing::Level;

    #[derive(Default)]
    struct RecordingClock {
        set: RefCell<Vec<i64>>,
        fail: bool,
    }

    impl SetClock for RecordingClock {
        fn set_time(&self, secs: i64) -> Result<()> {
            if self.fail {
                return Err(Error::clock("permission denied"));
            }
            self.set.borrow_mut().push(secs);
            Ok(())
        }
    }

    #[test]
    fn test_sync_applies_timestamp() {
        let clock = RecordingClock::default();
        let log = MemoryLogger::default();

        sync_clock(&clock, CanonicalTimestamp(1_710_498_030), &log).unwrap();
        assert_eq!(*clock.set.borrow(), vec![1_710_498_030]);
        assert!(log.contains(Level::INFO, "successfully synced internet time"));
    }

    #[test]
    fn test_sync_skips_failure_sentinel() {
        let clock = RecordingClock::default();
        let log = MemoryLogger::default();

        assert!(sync_clock(&clock, CanonicalTimestamp::FAILED, &log).is_err());
        assert!(clock.set.borrow().is_empty());
    }

    #[test]
    fn test_sync_reports_clock_error() {
        let clock = RecordingClock {
            fail: true,
            ..Default::default()
        };
        let log = MemoryLogger::default();

        let err = sync_clock(&clock, CanonicalTimestamp(1_710_498_030), &log).unwrap_err();
        assert!(matches!(err, Error::Clock(_)));
        assert!(log.contains(Level::ERROR, "failed to sync device time"));
    }
}
