//! Typed system-call invocation with exact error, retry, and byte-layout
//! semantics.
//!
//! # Design
//!
//! Everything in this crate follows four rules:
//!
//! * **One conversion point.** A raw return value crosses into typed space
//!   through [`call::demux`] and nowhere else. On the failure sentinel, errno
//!   is read immediately, before anything can overwrite it.
//! * **Retry is the caller's policy.** Wrappers take an explicit
//!   `retry_on_interrupt` flag for EINTR. Would-block conditions are not
//!   retried on a thread at all; [`nonblock`] suspends the calling task
//!   cooperatively between attempts.
//! * **Byte layouts stay at the boundary.** Addresses, socket options,
//!   command words, and time values are typed on this side; the exact kernel
//!   bytes exist only inside the codec that owns each layout.
//! * **Errors carry the code and nothing else.** [`Errno`] wraps the number,
//!   compares exactly, and never logs; reporting belongs to the caller.
//!
//! Kernel entry points live behind the private `platform` module, one shim
//! per call. In test builds a scripted driver can stand in for the kernel,
//! which is how the retry and argument-forwarding contracts are pinned.

pub mod call;
pub mod errno;
pub mod fd;
pub mod ioctl;
pub mod nonblock;
mod platform;
pub mod signal;
pub mod socket;
pub mod suspend;
pub mod sysinfo;
pub mod terminal;
pub mod time;

#[cfg(test)]
mod fd_tests;
#[cfg(test)]
mod suspend_tests;
#[cfg(test)]
mod terminal_tests;

pub use call::{Sentinel, demux, nothing_or_errno, value_or_errno};
pub use errno::{Errno, Result};
pub use fd::{FdFlags, FileDescriptor, Mode, OpenFlags, Whence};
pub use nonblock::{BlockRetry, retry_while_blocking};
pub use suspend::{CancelToken, Sleep, sleep};
