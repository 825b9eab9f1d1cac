//! Socket options as typed values.
//!
//! Every option couples a protocol level, an integer id, and an exact
//! fixed-size payload. Reads and writes always pass the payload's full size;
//! if the kernel answers a read with a different length than the option's
//! layout, the value is not decoded and the call fails.

use core::mem::MaybeUninit;

use libc::{c_int, c_void, socklen_t};

use crate::call::nothing_or_errno;
use crate::errno::{Errno, Result};
use crate::fd::FileDescriptor;
use crate::platform;
use crate::time::TimeVal;

/// Protocol level an option lives at.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct OptionLevel(c_int);

impl OptionLevel {
    /// Options of the socket layer itself.
    pub const SOCKET: Self = Self(libc::SOL_SOCKET);
    /// TCP protocol options.
    pub const TCP: Self = Self(libc::IPPROTO_TCP);
    /// IPv4 protocol options.
    pub const IP: Self = Self(libc::IPPROTO_IP);
    /// IPv6 protocol options.
    pub const IPV6: Self = Self(libc::IPPROTO_IPV6);

    #[inline]
    pub const fn from_raw(raw: c_int) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> c_int {
        self.0
    }
}

/// A typed socket option.
///
/// `Raw` is the exact payload the kernel reads and writes for this option;
/// the trait converts between it and the typed value. Encoding and decoding
/// use the same payload size by construction.
pub trait SocketOption: Sized {
    const LEVEL: OptionLevel;
    const NAME: c_int;

    /// Kernel payload layout.
    type Raw: Copy;

    fn to_raw(&self) -> Self::Raw;
    fn from_raw(raw: Self::Raw) -> Self;
}

impl FileDescriptor {
    /// Write a socket option.
    ///
    /// # Errors
    /// * `ENOTSOCK` - Descriptor is not a socket
    /// * `ENOPROTOOPT` - Option unknown at this level
    /// * `EINTR` - Interrupted and `retry_on_interrupt` was false
    pub fn set_option<O: SocketOption>(&self, option: &O, retry_on_interrupt: bool) -> Result<()> {
        let raw = option.to_raw();
        nothing_or_errno(retry_on_interrupt, || unsafe {
            platform::setsockopt(
                self.raw(),
                O::LEVEL.raw(),
                O::NAME,
                (&raw as *const O::Raw).cast::<c_void>(),
                size_of::<O::Raw>() as socklen_t,
            )
        })
    }

    /// Read a socket option.
    ///
    /// # Errors
    /// * `ENOTSOCK` - Descriptor is not a socket
    /// * `ENOPROTOOPT` - Option unknown at this level
    /// * `EINVAL` - Kernel answered with a payload size other than the
    ///   option's layout
    pub fn option<O: SocketOption>(&self, retry_on_interrupt: bool) -> Result<O> {
        let mut raw = MaybeUninit::<O::Raw>::uninit();
        let expected = size_of::<O::Raw>() as socklen_t;
        let mut len = expected;
        nothing_or_errno(retry_on_interrupt, || {
            len = expected;
            unsafe {
                platform::getsockopt(
                    self.raw(),
                    O::LEVEL.raw(),
                    O::NAME,
                    raw.as_mut_ptr().cast::<c_void>(),
                    &mut len,
                )
            }
        })?;
        if len != expected {
            return Err(Errno::EINVAL);
        }
        Ok(O::from_raw(unsafe { raw.assume_init() }))
    }
}

macro_rules! bool_option {
    ($(#[$attr:meta])* $name:ident, $level:expr, $id:expr) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub struct $name(pub bool);

        impl SocketOption for $name {
            const LEVEL: OptionLevel = $level;
            const NAME: c_int = $id;
            type Raw = c_int;

            fn to_raw(&self) -> c_int {
                self.0 as c_int
            }

            fn from_raw(raw: c_int) -> Self {
                Self(raw != 0)
            }
        }
    };
}

macro_rules! int_option {
    ($(#[$attr:meta])* $name:ident, $level:expr, $id:expr) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug)]
        pub struct $name(pub c_int);

        impl SocketOption for $name {
            const LEVEL: OptionLevel = $level;
            const NAME: c_int = $id;
            type Raw = c_int;

            fn to_raw(&self) -> c_int {
                self.0
            }

            fn from_raw(raw: c_int) -> Self {
                Self(raw)
            }
        }
    };
}

bool_option!(
    /// SO_DEBUG: kernel-level socket debugging.
    Debugging,
    OptionLevel::SOCKET,
    libc::SO_DEBUG
);

bool_option!(
    /// SO_KEEPALIVE: periodic liveness probes on connected sockets.
    KeepAlive,
    OptionLevel::SOCKET,
    libc::SO_KEEPALIVE
);

bool_option!(
    /// SO_REUSEADDR: allow binding an address in TIME_WAIT.
    ReuseAddress,
    OptionLevel::SOCKET,
    libc::SO_REUSEADDR
);

bool_option!(
    /// SO_BROADCAST: permit datagrams to broadcast addresses.
    Broadcast,
    OptionLevel::SOCKET,
    libc::SO_BROADCAST
);

bool_option!(
    /// TCP_NODELAY: send segments immediately instead of coalescing.
    TcpNoDelay,
    OptionLevel::TCP,
    libc::TCP_NODELAY
);

int_option!(
    /// SO_RCVBUF: receive buffer size in bytes. The kernel may round the
    /// value it stores.
    ReceiveBufferSize,
    OptionLevel::SOCKET,
    libc::SO_RCVBUF
);

int_option!(
    /// SO_SNDBUF: send buffer size in bytes. The kernel may round the value
    /// it stores.
    SendBufferSize,
    OptionLevel::SOCKET,
    libc::SO_SNDBUF
);

/// SO_RCVTIMEO: receive timeout. Zero means wait forever.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ReceiveTimeout(pub TimeVal);

impl SocketOption for ReceiveTimeout {
    const LEVEL: OptionLevel = OptionLevel::SOCKET;
    const NAME: c_int = libc::SO_RCVTIMEO;
    type Raw = libc::timeval;

    fn to_raw(&self) -> libc::timeval {
        self.0.to_timeval()
    }

    fn from_raw(raw: libc::timeval) -> Self {
        Self(TimeVal::from_timeval(raw))
    }
}

/// SO_SNDTIMEO: send timeout. Zero means wait forever.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SendTimeout(pub TimeVal);

impl SocketOption for SendTimeout {
    const LEVEL: OptionLevel = OptionLevel::SOCKET;
    const NAME: c_int = libc::SO_SNDTIMEO;
    type Raw = libc::timeval;

    fn to_raw(&self) -> libc::timeval {
        self.0.to_timeval()
    }

    fn from_raw(raw: libc::timeval) -> Self {
        Self(TimeVal::from_timeval(raw))
    }
}

/// SO_LINGER: `Some(seconds)` blocks close until queued data drains or the
/// timeout passes; `None` closes in the background.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Linger(pub Option<c_int>);

impl SocketOption for Linger {
    const LEVEL: OptionLevel = OptionLevel::SOCKET;
    const NAME: c_int = libc::SO_LINGER;
    type Raw = libc::linger;

    fn to_raw(&self) -> libc::linger {
        libc::linger {
            l_onoff: self.0.is_some() as c_int,
            l_linger: self.0.unwrap_or(0),
        }
    }

    fn from_raw(raw: libc::linger) -> Self {
        Self((raw.l_onoff != 0).then_some(raw.l_linger))
    }
}

/// SO_ERROR: the pending asynchronous error, cleared by reading. Read-only;
/// the kernel rejects writes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PendingError(pub Option<Errno>);

impl SocketOption for PendingError {
    const LEVEL: OptionLevel = OptionLevel::SOCKET;
    const NAME: c_int = libc::SO_ERROR;
    type Raw = c_int;

    fn to_raw(&self) -> c_int {
        match self.0 {
            Some(errno) => errno.raw(),
            None => 0,
        }
    }

    fn from_raw(raw: c_int) -> Self {
        Self((raw != 0).then(|| Errno::from_raw(raw)))
    }
}
