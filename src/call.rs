//! Syscall result demultiplexing and the interruption-retry policy.
//!
//! This module is the single point of error conversion for the whole crate.
//! [`demux`] turns a raw sentinel return into `Result<_, Errno>`, reading the
//! thread-local error slot immediately; nothing may run between the failing
//! call and the read, or the slot could be overwritten. The two call shapes
//! ([`value_or_errno`], [`nothing_or_errno`]) fold in the EINTR retry loop
//! every blocking wrapper needs.

use crate::errno::{Errno, Result};

/// Raw return conventions where one magic value signals failure and the
/// detail sits in the errno slot.
pub trait Sentinel: Copy {
    fn is_failure(self) -> bool;
}

impl Sentinel for i32 {
    #[inline]
    fn is_failure(self) -> bool {
        self == -1
    }
}

impl Sentinel for i64 {
    #[inline]
    fn is_failure(self) -> bool {
        self == -1
    }
}

impl Sentinel for isize {
    #[inline]
    fn is_failure(self) -> bool {
        self == -1
    }
}

/// `SIG_ERR`-style handle returns: all-ones means failure.
impl Sentinel for usize {
    #[inline]
    fn is_failure(self) -> bool {
        self == usize::MAX
    }
}

/// Convert a raw sentinel return to a typed result (single conversion point).
///
/// Must be applied to a return value with no call in between; the errno read
/// on the failure path is only valid immediately after the failing call.
///
/// # Examples
///
/// ```
/// use sysgate::call::demux;
///
/// assert_eq!(demux(42isize), Ok(42));
/// ```
#[inline]
pub fn demux<R: Sentinel>(raw: R) -> Result<R> {
    if raw.is_failure() {
        Err(Errno::last())
    } else {
        Ok(raw)
    }
}

/// Run a raw call and map its sentinel, retrying on EINTR when asked.
///
/// `call` must perform exactly one raw call per invocation. On
/// `Err(Errno::EINTR)` with `retry_on_interrupt` set, the call is re-issued
/// immediately and indefinitely: the interrupting signal has already been
/// delivered, so there is nothing to wait for. Any other outcome, success or
/// failure, returns at once. With the flag clear, EINTR is an ordinary
/// failure.
///
/// ```ignore
/// let count = value_or_errno(retry_on_interrupt, || {
///     platform::read(fd.raw(), buf)
/// })?;
/// ```
#[inline]
pub fn value_or_errno<R, F>(retry_on_interrupt: bool, mut call: F) -> Result<R>
where
    R: Sentinel,
    F: FnMut() -> R,
{
    loop {
        match demux(call()) {
            Err(e) if retry_on_interrupt && e == Errno::EINTR => continue,
            other => return other,
        }
    }
}

/// [`value_or_errno`] for side-effect-only calls: the sentinel's payload is
/// dropped and success is `()`.
#[inline]
pub fn nothing_or_errno<R, F>(retry_on_interrupt: bool, call: F) -> Result<()>
where
    R: Sentinel,
    F: FnMut() -> R,
{
    value_or_errno(retry_on_interrupt, call).map(|_| ())
}
