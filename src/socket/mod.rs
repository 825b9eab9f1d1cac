//! Sockets: creation, endpoint binding, and data transfer.
//!
//! # Design
//!
//! Socket calls are descriptor methods, same as the file operations: each one
//! is a thin typed shell over the platform call, routed through the one
//! sentinel-to-errno conversion point. Addresses cross the kernel boundary
//! only as [`RawSocketAddr`] blocks produced and consumed by the codec in
//! [`addr`]; options only as the fixed-size payloads defined in [`option`].
//!
//! Blocking transfer calls have `_async` twins that cooperate with the
//! would-block retry loop instead of occupying a thread.

pub mod addr;
pub mod option;

#[cfg(test)]
mod addr_tests;
#[cfg(test)]
mod option_tests;

use libc::c_int;

use crate::call::{nothing_or_errno, value_or_errno};
use crate::errno::{Errno, Result};
use crate::fd::FileDescriptor;
use crate::nonblock::{BlockRetry, retry_while_blocking};
use crate::platform;

pub use addr::{
    AddressFamily, Ipv4Addr, Ipv6Addr, RawSocketAddr, SocketAddr, SocketAddrV4, SocketAddrV6,
    UnixAddr,
};
pub use option::{OptionLevel, SocketOption};

/// Socket communication style.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct SocketType(c_int);

impl SocketType {
    /// Ordered, reliable byte stream.
    pub const STREAM: Self = Self(libc::SOCK_STREAM);
    /// Unordered datagrams with preserved boundaries.
    pub const DGRAM: Self = Self(libc::SOCK_DGRAM);
    /// Ordered, reliable datagrams with preserved boundaries.
    pub const SEQPACKET: Self = Self(libc::SOCK_SEQPACKET);
    /// Raw protocol access.
    pub const RAW: Self = Self(libc::SOCK_RAW);

    #[inline]
    pub const fn from_raw(raw: c_int) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> c_int {
        self.0
    }
}

/// Which direction [`FileDescriptor::shutdown`] closes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(i32)]
pub enum ShutdownHow {
    Read = libc::SHUT_RD,
    Write = libc::SHUT_WR,
    ReadWrite = libc::SHUT_RDWR,
}

bitflags::bitflags! {
    /// Per-call flags for the transfer operations.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct MsgFlags: c_int {
        /// Read data without consuming it.
        const PEEK = libc::MSG_PEEK;
        /// Fail with EAGAIN instead of blocking, regardless of descriptor
        /// mode.
        const DONTWAIT = libc::MSG_DONTWAIT;
        /// Report datagram truncation in the return value.
        const TRUNC = libc::MSG_TRUNC;
        /// Block until the full request is transferred.
        const WAITALL = libc::MSG_WAITALL;
        /// Suppress SIGPIPE on a closed peer.
        #[cfg(any(target_os = "linux", target_os = "android"))]
        const NOSIGNAL = libc::MSG_NOSIGNAL;
    }
}

/// Create a socket.
///
/// # Errors
/// * `EAFNOSUPPORT` - Family not supported by this kernel
/// * `EPROTONOSUPPORT` - Protocol not supported within the family
/// * `EMFILE` - Descriptor table full
pub fn socket(family: AddressFamily, ty: SocketType, protocol: c_int) -> Result<FileDescriptor> {
    value_or_errno(false, || platform::socket(family.raw(), ty.raw(), protocol))
        .map(FileDescriptor::from_raw)
}

/// Create a pair of connected sockets. Local family only.
///
/// # Errors
/// * `EOPNOTSUPP` - The family does not support pairs
pub fn socket_pair(
    family: AddressFamily,
    ty: SocketType,
    protocol: c_int,
) -> Result<(FileDescriptor, FileDescriptor)> {
    let mut fds: [c_int; 2] = [0; 2];
    nothing_or_errno(false, || {
        platform::socketpair(family.raw(), ty.raw(), protocol, &mut fds)
    })?;
    Ok((
        FileDescriptor::from_raw(fds[0]),
        FileDescriptor::from_raw(fds[1]),
    ))
}

impl FileDescriptor {
    /// Bind the socket to a local address.
    ///
    /// # Errors
    /// * `EADDRINUSE` - Address already bound
    /// * `EACCES` - Address is protected
    /// * Any encode failure from [`SocketAddr::to_raw`]
    pub fn bind(&self, address: &SocketAddr) -> Result<()> {
        let raw = address.to_raw()?;
        nothing_or_errno(false, || unsafe {
            platform::bind(self.raw(), raw.as_ptr(), raw.len())
        })
    }

    /// Connect the socket to a remote address.
    ///
    /// An interrupted connect keeps completing in the background, so
    /// retrying it raises EALREADY rather than reissuing the attempt; most
    /// callers want `retry_on_interrupt` false here.
    ///
    /// # Errors
    /// * `ECONNREFUSED` - Nothing listening at the address
    /// * `EINPROGRESS` - Non-blocking connect underway
    pub fn connect(&self, address: &SocketAddr, retry_on_interrupt: bool) -> Result<()> {
        let raw = address.to_raw()?;
        nothing_or_errno(retry_on_interrupt, || unsafe {
            platform::connect(self.raw(), raw.as_ptr(), raw.len())
        })
    }

    /// Mark the socket as accepting connections.
    ///
    /// # Errors
    /// * `EOPNOTSUPP` - Socket type cannot listen
    pub fn listen(&self, backlog: c_int) -> Result<()> {
        nothing_or_errno(false, || platform::listen(self.raw(), backlog))
    }

    /// Accept one pending connection, returning the new descriptor and the
    /// peer's address.
    ///
    /// # Errors
    /// * `EAGAIN` - Non-blocking and no connection pending
    /// * `ECONNABORTED` - Connection aborted before accept
    pub fn accept(&self, retry_on_interrupt: bool) -> Result<(FileDescriptor, SocketAddr)> {
        let mut raw = RawSocketAddr::zeroed();
        let mut len = RawSocketAddr::capacity();
        let fd = value_or_errno(retry_on_interrupt, || {
            // A retried attempt starts from the full capacity again.
            len = RawSocketAddr::capacity();
            unsafe { platform::accept(self.raw(), raw.as_mut_ptr(), &mut len) }
        })?;
        raw.set_len(len);
        Ok((FileDescriptor::from_raw(fd), SocketAddr::from_raw(&raw)?))
    }

    /// The address this socket is bound to.
    pub fn local_address(&self) -> Result<SocketAddr> {
        let mut raw = RawSocketAddr::zeroed();
        let mut len = RawSocketAddr::capacity();
        nothing_or_errno(false, || unsafe {
            platform::getsockname(self.raw(), raw.as_mut_ptr(), &mut len)
        })?;
        raw.set_len(len);
        SocketAddr::from_raw(&raw)
    }

    /// Send on a connected socket. Returns the number of bytes queued.
    ///
    /// # Errors
    /// * `EAGAIN` - Non-blocking and the send buffer is full
    /// * `EPIPE` - Peer has closed
    pub fn send(&self, buf: &[u8], flags: MsgFlags, retry_on_interrupt: bool) -> Result<usize> {
        value_or_errno(retry_on_interrupt, || {
            platform::send(self.raw(), buf, flags.bits())
        })
        .map(|n| n as usize)
    }

    /// Receive from a connected socket. Returns the number of bytes read;
    /// zero on a stream socket means the peer shut down.
    ///
    /// # Errors
    /// * `EAGAIN` - Non-blocking and nothing to read
    pub fn recv(&self, buf: &mut [u8], flags: MsgFlags, retry_on_interrupt: bool) -> Result<usize> {
        value_or_errno(retry_on_interrupt, || {
            platform::recv(self.raw(), buf, flags.bits())
        })
        .map(|n| n as usize)
    }

    /// Send a datagram to an explicit address.
    pub fn send_to(
        &self,
        buf: &[u8],
        address: &SocketAddr,
        flags: MsgFlags,
        retry_on_interrupt: bool,
    ) -> Result<usize> {
        let raw = address.to_raw()?;
        value_or_errno(retry_on_interrupt, || unsafe {
            platform::sendto(self.raw(), buf, flags.bits(), raw.as_ptr(), raw.len())
        })
        .map(|n| n as usize)
    }

    /// Receive a datagram along with its source address.
    pub fn recv_from(
        &self,
        buf: &mut [u8],
        flags: MsgFlags,
        retry_on_interrupt: bool,
    ) -> Result<(usize, SocketAddr)> {
        let mut raw = RawSocketAddr::zeroed();
        let mut len = RawSocketAddr::capacity();
        let n = value_or_errno(retry_on_interrupt, || {
            len = RawSocketAddr::capacity();
            unsafe { platform::recvfrom(self.raw(), buf, flags.bits(), raw.as_mut_ptr(), &mut len) }
        })?;
        raw.set_len(len);
        Ok((n as usize, SocketAddr::from_raw(&raw)?))
    }

    /// Close one or both directions of the connection.
    pub fn shutdown(&self, how: ShutdownHow) -> Result<()> {
        nothing_or_errno(false, || platform::shutdown(self.raw(), how as c_int))
    }

    /// [`accept`](Self::accept) with the would-block retry loop, for
    /// listeners in non-blocking mode.
    pub async fn accept_async(
        &self,
        policy: &BlockRetry,
    ) -> Result<(FileDescriptor, SocketAddr)> {
        retry_while_blocking(policy, || self.accept(true)).await
    }

    /// [`connect`](Self::connect) with the would-block retry loop, for
    /// sockets in non-blocking mode.
    ///
    /// A non-blocking connect reports EINPROGRESS, then EALREADY while the
    /// handshake runs, then EISCONN once it is done; that last one is
    /// success, not an error.
    pub async fn connect_async(&self, address: &SocketAddr, policy: &BlockRetry) -> Result<()> {
        let raw = address.to_raw()?;
        let outcome = retry_while_blocking(policy, || {
            nothing_or_errno(true, || unsafe {
                platform::connect(self.raw(), raw.as_ptr(), raw.len())
            })
        })
        .await;
        match outcome {
            Err(e) if e == Errno::EISCONN => Ok(()),
            other => other,
        }
    }

    /// [`send`](Self::send) with the would-block retry loop.
    pub async fn send_async(
        &self,
        buf: &[u8],
        flags: MsgFlags,
        policy: &BlockRetry,
    ) -> Result<usize> {
        retry_while_blocking(policy, || self.send(buf, flags, true)).await
    }

    /// [`recv`](Self::recv) with the would-block retry loop.
    pub async fn recv_async(
        &self,
        buf: &mut [u8],
        flags: MsgFlags,
        policy: &BlockRetry,
    ) -> Result<usize> {
        retry_while_blocking(policy, || self.recv(buf, flags, true)).await
    }
}
