//! Kernel error codes with errno-compatible representation.
//!
//! `Errno` is the failure half of every [`Result`] in this crate. Values are
//! taken from `libc` rather than hand-typed, so the constants track the target
//! platform. The thread-local error slot is read at the failure site and
//! nowhere else: sentinel-returning calls go through [`crate::call::demux`],
//! and the few pointer-returning calls read [`Errno::last`] on a null return.

use core::fmt;

use libc::c_int;

/// A kernel error number.
///
/// Any raw value is representable; codes outside the named set still carry
/// their number and print as "Unknown error".
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct Errno(c_int);

impl Errno {
    /// Operation not permitted
    pub const EPERM: Self = Self(libc::EPERM);
    /// No such file or directory
    pub const ENOENT: Self = Self(libc::ENOENT);
    /// No such process
    pub const ESRCH: Self = Self(libc::ESRCH);
    /// Interrupted system call
    pub const EINTR: Self = Self(libc::EINTR);
    /// I/O error
    pub const EIO: Self = Self(libc::EIO);
    /// No such device or address
    pub const ENXIO: Self = Self(libc::ENXIO);
    /// Argument list too long
    pub const E2BIG: Self = Self(libc::E2BIG);
    /// Bad file descriptor
    pub const EBADF: Self = Self(libc::EBADF);
    /// No child processes
    pub const ECHILD: Self = Self(libc::ECHILD);
    /// Resource temporarily unavailable. `EWOULDBLOCK` shares this value on
    /// every platform this crate targets.
    pub const EAGAIN: Self = Self(libc::EAGAIN);
    /// Out of memory
    pub const ENOMEM: Self = Self(libc::ENOMEM);
    /// Permission denied
    pub const EACCES: Self = Self(libc::EACCES);
    /// Bad address
    pub const EFAULT: Self = Self(libc::EFAULT);
    /// Device or resource busy
    pub const EBUSY: Self = Self(libc::EBUSY);
    /// File exists
    pub const EEXIST: Self = Self(libc::EEXIST);
    /// Cross-device link
    pub const EXDEV: Self = Self(libc::EXDEV);
    /// No such device
    pub const ENODEV: Self = Self(libc::ENODEV);
    /// Not a directory
    pub const ENOTDIR: Self = Self(libc::ENOTDIR);
    /// Is a directory
    pub const EISDIR: Self = Self(libc::EISDIR);
    /// Invalid argument
    pub const EINVAL: Self = Self(libc::EINVAL);
    /// Too many open files in system
    pub const ENFILE: Self = Self(libc::ENFILE);
    /// Too many open files
    pub const EMFILE: Self = Self(libc::EMFILE);
    /// Inappropriate ioctl for device
    pub const ENOTTY: Self = Self(libc::ENOTTY);
    /// File too large
    pub const EFBIG: Self = Self(libc::EFBIG);
    /// No space left on device
    pub const ENOSPC: Self = Self(libc::ENOSPC);
    /// Illegal seek
    pub const ESPIPE: Self = Self(libc::ESPIPE);
    /// Read-only file system
    pub const EROFS: Self = Self(libc::EROFS);
    /// Broken pipe
    pub const EPIPE: Self = Self(libc::EPIPE);
    /// Numerical result out of range
    pub const ERANGE: Self = Self(libc::ERANGE);
    /// File name too long
    pub const ENAMETOOLONG: Self = Self(libc::ENAMETOOLONG);
    /// Function not implemented
    pub const ENOSYS: Self = Self(libc::ENOSYS);
    /// Socket operation on non-socket
    pub const ENOTSOCK: Self = Self(libc::ENOTSOCK);
    /// Message too long
    pub const EMSGSIZE: Self = Self(libc::EMSGSIZE);
    /// Protocol not available
    pub const ENOPROTOOPT: Self = Self(libc::ENOPROTOOPT);
    /// Protocol not supported
    pub const EPROTONOSUPPORT: Self = Self(libc::EPROTONOSUPPORT);
    /// Address family not supported by protocol
    pub const EAFNOSUPPORT: Self = Self(libc::EAFNOSUPPORT);
    /// Address already in use
    pub const EADDRINUSE: Self = Self(libc::EADDRINUSE);
    /// Cannot assign requested address
    pub const EADDRNOTAVAIL: Self = Self(libc::EADDRNOTAVAIL);
    /// Network is unreachable
    pub const ENETUNREACH: Self = Self(libc::ENETUNREACH);
    /// Software caused connection abort
    pub const ECONNABORTED: Self = Self(libc::ECONNABORTED);
    /// Connection reset by peer
    pub const ECONNRESET: Self = Self(libc::ECONNRESET);
    /// No buffer space available
    pub const ENOBUFS: Self = Self(libc::ENOBUFS);
    /// Transport endpoint is already connected
    pub const EISCONN: Self = Self(libc::EISCONN);
    /// Transport endpoint is not connected
    pub const ENOTCONN: Self = Self(libc::ENOTCONN);
    /// Connection timed out
    pub const ETIMEDOUT: Self = Self(libc::ETIMEDOUT);
    /// Connection refused
    pub const ECONNREFUSED: Self = Self(libc::ECONNREFUSED);
    /// No route to host
    pub const EHOSTUNREACH: Self = Self(libc::EHOSTUNREACH);
    /// Operation already in progress
    pub const EALREADY: Self = Self(libc::EALREADY);
    /// Operation now in progress
    pub const EINPROGRESS: Self = Self(libc::EINPROGRESS);
    /// Operation canceled. Also how a cancelled blocking-retry loop reports
    /// itself.
    pub const ECANCELED: Self = Self(libc::ECANCELED);
    /// Value too large for defined data type
    pub const EOVERFLOW: Self = Self(libc::EOVERFLOW);

    /// Create an `Errno` from a raw errno value.
    #[inline]
    pub const fn from_raw(raw: c_int) -> Self {
        Self(raw)
    }

    /// Get the raw errno value.
    #[inline]
    pub const fn raw(self) -> c_int {
        self.0
    }

    /// Read the calling thread's current error slot.
    ///
    /// Only meaningful immediately after a failing call; any intervening call
    /// may overwrite the slot.
    #[inline]
    pub fn last() -> Self {
        Self(crate::platform::errno())
    }

    /// Overwrite the calling thread's error slot.
    #[inline]
    pub fn set_last(self) {
        crate::platform::set_errno(self.0);
    }

    /// Whether this code belongs to the would-block family retried by
    /// [`crate::nonblock::retry_while_blocking`]: the operation could not make
    /// progress yet but is expected to once the resource is ready.
    ///
    /// `EWOULDBLOCK` is covered through its shared value with `EAGAIN`.
    #[inline]
    pub const fn is_blocking(self) -> bool {
        matches!(
            self.0,
            libc::EAGAIN | libc::EINPROGRESS | libc::EALREADY
        )
    }

    /// Get a human-readable description of the error.
    pub const fn as_str(self) -> &'static str {
        match self.0 {
            libc::EPERM => "Operation not permitted",
            libc::ENOENT => "No such file or directory",
            libc::ESRCH => "No such process",
            libc::EINTR => "Interrupted system call",
            libc::EIO => "I/O error",
            libc::ENXIO => "No such device or address",
            libc::E2BIG => "Argument list too long",
            libc::EBADF => "Bad file descriptor",
            libc::ECHILD => "No child processes",
            libc::EAGAIN => "Resource temporarily unavailable",
            libc::ENOMEM => "Out of memory",
            libc::EACCES => "Permission denied",
            libc::EFAULT => "Bad address",
            libc::EBUSY => "Device or resource busy",
            libc::EEXIST => "File exists",
            libc::EXDEV => "Cross-device link",
            libc::ENODEV => "No such device",
            libc::ENOTDIR => "Not a directory",
            libc::EISDIR => "Is a directory",
            libc::EINVAL => "Invalid argument",
            libc::ENFILE => "Too many open files in system",
            libc::EMFILE => "Too many open files",
            libc::ENOTTY => "Inappropriate ioctl for device",
            libc::EFBIG => "File too large",
            libc::ENOSPC => "No space left on device",
            libc::ESPIPE => "Illegal seek",
            libc::EROFS => "Read-only file system",
            libc::EPIPE => "Broken pipe",
            libc::ERANGE => "Numerical result out of range",
            libc::ENAMETOOLONG => "File name too long",
            libc::ENOSYS => "Function not implemented",
            libc::ENOTSOCK => "Socket operation on non-socket",
            libc::EMSGSIZE => "Message too long",
            libc::ENOPROTOOPT => "Protocol not available",
            libc::EPROTONOSUPPORT => "Protocol not supported",
            libc::EAFNOSUPPORT => "Address family not supported by protocol",
            libc::EADDRINUSE => "Address already in use",
            libc::EADDRNOTAVAIL => "Cannot assign requested address",
            libc::ENETUNREACH => "Network is unreachable",
            libc::ECONNABORTED => "Software caused connection abort",
            libc::ECONNRESET => "Connection reset by peer",
            libc::ENOBUFS => "No buffer space available",
            libc::EISCONN => "Transport endpoint is already connected",
            libc::ENOTCONN => "Transport endpoint is not connected",
            libc::ETIMEDOUT => "Connection timed out",
            libc::ECONNREFUSED => "Connection refused",
            libc::EHOSTUNREACH => "No route to host",
            libc::EALREADY => "Operation already in progress",
            libc::EINPROGRESS => "Operation now in progress",
            libc::ECANCELED => "Operation canceled",
            libc::EOVERFLOW => "Value too large for defined data type",
            _ => "Unknown error",
        }
    }
}

impl fmt::Debug for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Errno({}: {})", self.0, self.as_str())
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::error::Error for Errno {}

impl From<Errno> for std::io::Error {
    fn from(errno: Errno) -> Self {
        std::io::Error::from_raw_os_error(errno.raw())
    }
}

/// Result type for syscall operations.
pub type Result<T> = core::result::Result<T, Errno>;
