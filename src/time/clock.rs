//! The per-clock read/set surface, nanosecond layout.

use libc::clockid_t;

use crate::call::nothing_or_errno;
use crate::errno::Result;
use crate::platform;
use crate::time::TimeSpec;

/// One of the kernel's clocks.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct ClockId(clockid_t);

impl ClockId {
    /// Wall-clock time; steps when the clock is set.
    pub const REALTIME: Self = Self(libc::CLOCK_REALTIME);
    /// Monotonic since an unspecified start; never steps back.
    pub const MONOTONIC: Self = Self(libc::CLOCK_MONOTONIC);
    /// CPU time consumed by this process.
    pub const PROCESS_CPUTIME: Self = Self(libc::CLOCK_PROCESS_CPUTIME_ID);
    /// CPU time consumed by this thread.
    pub const THREAD_CPUTIME: Self = Self(libc::CLOCK_THREAD_CPUTIME_ID);
    /// Monotonic including time spent suspended.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub const BOOTTIME: Self = Self(libc::CLOCK_BOOTTIME);

    #[inline]
    pub const fn from_raw(raw: clockid_t) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> clockid_t {
        self.0
    }

    /// Read the clock.
    pub fn time(self) -> Result<TimeSpec> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        nothing_or_errno(false, || platform::clock_gettime(self.0, &mut ts))?;
        Ok(TimeSpec::from_timespec(ts))
    }

    /// The clock's tick granularity.
    pub fn resolution(self) -> Result<TimeSpec> {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };
        nothing_or_errno(false, || platform::clock_getres(self.0, &mut ts))?;
        Ok(TimeSpec::from_timespec(ts))
    }

    /// Set the clock to `time`. The argument is handed to the kernel as
    /// given.
    ///
    /// # Errors
    /// * `EPERM` - Caller may not set this clock
    /// * `EINVAL` - Clock cannot be set, or the value is out of range
    pub fn set_time(self, time: TimeSpec) -> Result<()> {
        let ts = time.to_timespec();
        nothing_or_errno(false, || platform::clock_settime(self.0, &ts))
    }
}
