//! Time values and conversions.
//!
//! # Design
//!
//! Two fixed-point layouts mirror the kernel's: seconds plus microseconds
//! ([`TimeVal`]) and seconds plus nanoseconds ([`TimeSpec`]). Conversions
//! from floating seconds floor the whole-second part, so the sub-second field
//! always lands in `[0, resolution)` the way the kernel structures expect;
//! narrowing between the two layouts truncates toward zero; nothing here
//! rounds. The time-of-day pair and the per-clock reads in [`clock`] move
//! these values across the kernel boundary, [`calendar`] breaks them into
//! civil fields.

pub mod calendar;
pub mod clock;

#[cfg(test)]
mod calendar_tests;
#[cfg(test)]
mod clock_tests;

use core::fmt;
use std::time::Duration;

use libc::{suseconds_t, time_t};

use crate::call::nothing_or_errno;
use crate::errno::Result;
use crate::platform;

const MICROS_PER_SECOND: i64 = 1_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MICRO: i64 = 1_000;

/// Whole seconds since the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Time(time_t);

impl Time {
    pub const EPOCH: Self = Self(0);

    #[inline]
    pub const fn from_raw(raw: time_t) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> time_t {
        self.0
    }

    /// The current wall-clock instant, truncated to whole seconds.
    pub fn now() -> Result<Self> {
        time_of_day().map(|tv| Self(tv.seconds))
    }
}

/// Seconds plus microseconds, the `timeval` layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeVal {
    seconds: time_t,
    microseconds: suseconds_t,
}

impl TimeVal {
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(seconds: time_t, microseconds: suseconds_t) -> Self {
        Self {
            seconds,
            microseconds,
        }
    }

    #[inline]
    pub const fn seconds(self) -> time_t {
        self.seconds
    }

    #[inline]
    pub const fn microseconds(self) -> suseconds_t {
        self.microseconds
    }

    /// Split floating seconds into the fixed-point layout. The whole-second
    /// part is floored, keeping the sub-second field in `[0, 1_000_000)` even
    /// for instants before the epoch; the scaled fraction truncates.
    pub fn from_seconds_f64(seconds: f64) -> Self {
        let whole = seconds.floor();
        let sub = ((seconds - whole) * MICROS_PER_SECOND as f64) as suseconds_t;
        Self::new(whole as time_t, sub)
    }

    /// The value as floating seconds.
    pub fn seconds_f64(self) -> f64 {
        self.seconds as f64 + self.microseconds as f64 / MICROS_PER_SECOND as f64
    }

    pub(crate) const fn from_timeval(tv: libc::timeval) -> Self {
        Self {
            seconds: tv.tv_sec,
            microseconds: tv.tv_usec,
        }
    }

    pub(crate) const fn to_timeval(self) -> libc::timeval {
        libc::timeval {
            tv_sec: self.seconds,
            tv_usec: self.microseconds,
        }
    }
}

impl fmt::Display for TimeVal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}s", self.seconds, self.microseconds.unsigned_abs())
    }
}

/// Widening conversion; exact.
impl From<TimeVal> for TimeSpec {
    fn from(tv: TimeVal) -> Self {
        Self::new(tv.seconds, tv.microseconds as i64 * NANOS_PER_MICRO)
    }
}

/// Narrowing conversion; sub-microsecond detail truncates toward zero.
impl From<TimeSpec> for TimeVal {
    fn from(ts: TimeSpec) -> Self {
        Self::new(ts.seconds, (ts.nanoseconds / NANOS_PER_MICRO) as suseconds_t)
    }
}

/// Exact; durations carry whole nanoseconds.
impl From<Duration> for TimeSpec {
    fn from(d: Duration) -> Self {
        Self::new(d.as_secs() as time_t, d.subsec_nanos() as i64)
    }
}

/// Sub-microsecond detail truncates.
impl From<Duration> for TimeVal {
    fn from(d: Duration) -> Self {
        Self::new(d.as_secs() as time_t, d.subsec_micros() as suseconds_t)
    }
}

/// Seconds plus nanoseconds, the `timespec` layout.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeSpec {
    seconds: time_t,
    nanoseconds: i64,
}

impl TimeSpec {
    pub const ZERO: Self = Self::new(0, 0);

    #[inline]
    pub const fn new(seconds: time_t, nanoseconds: i64) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }

    #[inline]
    pub const fn seconds(self) -> time_t {
        self.seconds
    }

    #[inline]
    pub const fn nanoseconds(self) -> i64 {
        self.nanoseconds
    }

    /// Split floating seconds into the fixed-point layout. The whole-second
    /// part is floored, keeping the sub-second field in `[0, 1_000_000_000)`
    /// even for instants before the epoch; the scaled fraction truncates.
    pub fn from_seconds_f64(seconds: f64) -> Self {
        let whole = seconds.floor();
        let sub = ((seconds - whole) * NANOS_PER_SECOND as f64) as i64;
        Self::new(whole as time_t, sub)
    }

    /// The value as floating seconds.
    pub fn seconds_f64(self) -> f64 {
        self.seconds as f64 + self.nanoseconds as f64 / NANOS_PER_SECOND as f64
    }

    pub(crate) const fn from_timespec(ts: libc::timespec) -> Self {
        Self {
            seconds: ts.tv_sec,
            nanoseconds: ts.tv_nsec as i64,
        }
    }

    pub(crate) const fn to_timespec(self) -> libc::timespec {
        libc::timespec {
            tv_sec: self.seconds,
            tv_nsec: self.nanoseconds as libc::c_long,
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}s", self.seconds, self.nanoseconds.unsigned_abs())
    }
}

/// The current wall-clock time at microsecond layout.
pub fn time_of_day() -> Result<TimeVal> {
    let mut tv = libc::timeval {
        tv_sec: 0,
        tv_usec: 0,
    };
    nothing_or_errno(false, || platform::gettimeofday(&mut tv))?;
    Ok(TimeVal::from_timeval(tv))
}

/// Set the wall clock to `time`. The argument is handed to the kernel as
/// given.
///
/// # Errors
/// * `EPERM` - Caller may not set the clock
/// * `EINVAL` - Value outside the clock's range
pub fn set_time_of_day(time: TimeVal) -> Result<()> {
    let tv = time.to_timeval();
    nothing_or_errno(false, || platform::settimeofday(&tv))
}
