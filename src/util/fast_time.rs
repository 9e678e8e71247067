//! Fast timing utilities using direct clock_gettime calls
//!
//! The dispatcher reads this clock immediately before and immediately after
//! each store call, so the read itself must be as cheap as possible.

use std::time::Duration;

/// Fast timestamp using direct clock_gettime with CLOCK_MONOTONIC
///
/// Resolution: Nanosecond
/// Speed: ~15-20ns per call (vs ~25-30ns for std::time::Instant)
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FastInstant {
    nanos: u64,
}

impl FastInstant {
    /// Get the current time using CLOCK_MONOTONIC
    #[inline(always)]
    pub fn now() -> Self {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
        unsafe {
            libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
        }

        let nanos = (ts.tv_sec as u64) * 1_000_000_000 + (ts.tv_nsec as u64);

        Self { nanos }
    }

    /// Nanoseconds elapsed between `earlier` and this instant
    ///
    /// Saturates at zero so a sample is never negative.
    #[inline(always)]
    pub fn nanos_since(&self, earlier: FastInstant) -> u64 {
        self.nanos.saturating_sub(earlier.nanos)
    }

    /// Calculate duration since another FastInstant
    #[inline(always)]
    pub fn duration_since(&self, earlier: FastInstant) -> Duration {
        Duration::from_nanos(self.nanos_since(earlier))
    }

    /// Get elapsed time since this instant
    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        Self::now().duration_since(*self)
    }
}
