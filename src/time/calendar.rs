//! Broken-down civil time.
//!
//! [`CalendarTime`] keeps its fields in the ranges people use: months run 1
//! to 12 and years are absolute, unlike the kernel's zero-based months and
//! 1900-based years. The remap happens exactly once, at the conversion
//! boundary in [`CalendarTime::from_time`] and [`CalendarTime::to_time`].

use core::fmt;
use core::mem;

use libc::{c_int, tm};

use crate::errno::{Errno, Result};
use crate::platform;
use crate::time::Time;

/// Which wall-clock zone a breakdown uses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Zone {
    Utc,
    Local,
}

/// A calendar date and time.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalendarTime {
    /// 0-60; 60 admits a leap second.
    pub second: c_int,
    /// 0-59.
    pub minute: c_int,
    /// 0-23.
    pub hour: c_int,
    /// Day of month, 1-31.
    pub day: c_int,
    /// 1-12.
    pub month: c_int,
    /// Absolute, e.g. 2024.
    pub year: c_int,
    /// Days since Sunday, 0-6. Recomputed by [`CalendarTime::to_time`].
    pub weekday: c_int,
    /// Days since January 1, 0-365. Recomputed by [`CalendarTime::to_time`].
    pub year_day: c_int,
    /// Daylight saving: positive in effect, zero not, negative unknown.
    pub dst: c_int,
}

impl CalendarTime {
    /// Break an epoch instant into civil fields.
    ///
    /// # Errors
    /// * `EOVERFLOW` - Instant out of the platform's calendar range
    pub fn from_time(time: Time, zone: Zone) -> Result<Self> {
        let raw = time.raw();
        let mut out: tm = unsafe { mem::zeroed() };
        let ok = match zone {
            Zone::Utc => platform::gmtime_r(&raw, &mut out),
            Zone::Local => platform::localtime_r(&raw, &mut out),
        };
        if !ok {
            return Err(Errno::last());
        }
        Ok(Self::from_tm(&out))
    }

    /// Collapse civil fields back to an epoch instant. Out-of-range fields
    /// normalize the way the platform's mktime does.
    ///
    /// An unrepresentable date comes back as `(time_t)-1`, which the platform
    /// call does not distinguish from the instant one second before the
    /// epoch.
    pub fn to_time(&self, zone: Zone) -> Time {
        let mut tm = self.to_tm();
        let raw = match zone {
            Zone::Utc => platform::timegm(&mut tm),
            Zone::Local => platform::mktime(&mut tm),
        };
        Time::from_raw(raw)
    }

    fn from_tm(tm: &tm) -> Self {
        Self {
            second: tm.tm_sec,
            minute: tm.tm_min,
            hour: tm.tm_hour,
            day: tm.tm_mday,
            month: tm.tm_mon + 1,
            year: tm.tm_year + 1900,
            weekday: tm.tm_wday,
            year_day: tm.tm_yday,
            dst: tm.tm_isdst,
        }
    }

    fn to_tm(&self) -> tm {
        let mut out: tm = unsafe { mem::zeroed() };
        out.tm_sec = self.second;
        out.tm_min = self.minute;
        out.tm_hour = self.hour;
        out.tm_mday = self.day;
        out.tm_mon = self.month - 1;
        out.tm_year = self.year - 1900;
        out.tm_wday = self.weekday;
        out.tm_yday = self.year_day;
        out.tm_isdst = self.dst;
        out
    }
}

impl Default for CalendarTime {
    /// Midnight January 1 1970, daylight saving unknown.
    fn default() -> Self {
        Self {
            second: 0,
            minute: 0,
            hour: 0,
            day: 1,
            month: 1,
            year: 1970,
            weekday: 0,
            year_day: 0,
            dst: -1,
        }
    }
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl fmt::Display for CalendarTime {
    /// asctime's fixed layout, without the trailing newline:
    /// `Thu Jan  1 00:00:00 1970`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:2} {:02}:{:02}:{:02} {}",
            WEEKDAYS[self.weekday.rem_euclid(7) as usize],
            MONTHS[(self.month - 1).rem_euclid(12) as usize],
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.year,
        )
    }
}
