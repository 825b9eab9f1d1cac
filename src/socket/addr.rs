//! Network and local endpoint addresses with kernel byte layouts.
//!
//! Typed values keep ports in host order and addresses as plain bytes;
//! [`SocketAddr::to_raw`] and [`SocketAddr::from_raw`] translate to and from
//! the family-tagged sockaddr blocks the kernel consumes, writing ports
//! big-endian and bounds-checking local-socket paths instead of truncating
//! them. Text conversion is delegated to the platform's inet_pton/inet_ntop
//! rather than reimplemented.

use core::fmt;
use core::mem;
use core::ptr;
use std::ffi::{CString, OsString};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use libc::{c_char, c_int, c_void, sa_family_t, socklen_t};

use crate::call::demux;
use crate::errno::{Errno, Result};
use crate::platform;

/// Address family discriminant.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct AddressFamily(c_int);

impl AddressFamily {
    /// Local (filesystem-path) sockets.
    pub const UNIX: Self = Self(libc::AF_UNIX);
    /// IPv4.
    pub const INET: Self = Self(libc::AF_INET);
    /// IPv6.
    pub const INET6: Self = Self(libc::AF_INET6);

    #[inline]
    pub const fn from_raw(raw: c_int) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> c_int {
        self.0
    }

    pub(crate) const fn sa_family(self) -> sa_family_t {
        self.0 as sa_family_t
    }
}

impl fmt::Debug for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            libc::AF_UNIX => "AF_UNIX",
            libc::AF_INET => "AF_INET",
            libc::AF_INET6 => "AF_INET6",
            _ => return write!(f, "AddressFamily({})", self.0),
        };
        write!(f, "AddressFamily({name})")
    }
}

// Longest textual forms the formatter can produce, per family
// (INET_ADDRSTRLEN / INET6_ADDRSTRLEN).
const V4_TEXT_MAX: usize = 16;
const V6_TEXT_MAX: usize = 46;

/// Parse `text` as a binary address of `family`, writing into `dst`.
///
/// The converter has three outcomes: 1 parsed, 0 text not valid for the
/// family (errno untouched, surfaced as EINVAL), -1 bad family (errno set).
fn pton(family: AddressFamily, text: &str, dst: *mut c_void) -> Result<()> {
    let text = CString::new(text).map_err(|_| Errno::EINVAL)?;
    match demux(unsafe { platform::inet_pton(family.raw(), &text, dst) }) {
        Ok(1) => Ok(()),
        Ok(_) => Err(Errno::EINVAL),
        Err(e) => Err(e),
    }
}

/// Format the binary address at `src` into `buf` and hand back the text.
///
/// The buffer is sized by this module for the family's longest form, so a
/// converter failure is a contract violation, not a runtime error.
fn ntop<'a>(family: AddressFamily, src: *const c_void, buf: &'a mut [c_char]) -> &'a str {
    let written = unsafe {
        platform::inet_ntop(family.raw(), src, buf.as_mut_ptr(), buf.len() as socklen_t)
    };
    if written.is_null() {
        unreachable!("inet_ntop rejected a {}-byte buffer", buf.len());
    }
    let text = unsafe { core::ffi::CStr::from_ptr(buf.as_ptr()) };
    match text.to_str() {
        Ok(text) => text,
        // The converter only emits ASCII.
        Err(_) => unreachable!("inet_ntop produced non-UTF-8 text"),
    }
}

/// An IPv4 address, stored as its four network-order bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ipv4Addr([u8; 4]);

impl Ipv4Addr {
    pub const UNSPECIFIED: Self = Self([0; 4]);
    pub const LOCALHOST: Self = Self([127, 0, 0, 1]);
    pub const BROADCAST: Self = Self([255; 4]);

    #[inline]
    pub const fn from_octets(octets: [u8; 4]) -> Self {
        Self(octets)
    }

    #[inline]
    pub const fn octets(self) -> [u8; 4] {
        self.0
    }

    pub const fn is_unspecified(self) -> bool {
        matches!(self.0, [0, 0, 0, 0])
    }

    pub const fn is_loopback(self) -> bool {
        self.0[0] == 127
    }

    pub const fn is_multicast(self) -> bool {
        self.0[0] >= 224 && self.0[0] <= 239
    }

    /// Parse dotted-decimal text.
    ///
    /// # Errors
    /// * `EINVAL` - Text is not a valid IPv4 address
    pub fn parse(text: &str) -> Result<Self> {
        let mut addr: libc::in_addr = unsafe { mem::zeroed() };
        pton(
            AddressFamily::INET,
            text,
            (&mut addr as *mut libc::in_addr).cast(),
        )?;
        Ok(Self::from_in_addr(addr))
    }

    pub(crate) const fn from_in_addr(addr: libc::in_addr) -> Self {
        Self(addr.s_addr.to_ne_bytes())
    }

    pub(crate) const fn to_in_addr(self) -> libc::in_addr {
        libc::in_addr {
            s_addr: u32::from_ne_bytes(self.0),
        }
    }
}

impl core::str::FromStr for Ipv4Addr {
    type Err = Errno;

    fn from_str(text: &str) -> Result<Self> {
        Self::parse(text)
    }
}

impl fmt::Display for Ipv4Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr = self.to_in_addr();
        let mut buf = [0 as c_char; V4_TEXT_MAX];
        f.write_str(ntop(
            AddressFamily::INET,
            (&addr as *const libc::in_addr).cast(),
            &mut buf,
        ))
    }
}

/// An IPv6 address, stored as its sixteen bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ipv6Addr([u8; 16]);

impl Ipv6Addr {
    pub const UNSPECIFIED: Self = Self([0; 16]);
    pub const LOCALHOST: Self = Self([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1]);

    #[inline]
    pub const fn from_octets(octets: [u8; 16]) -> Self {
        Self(octets)
    }

    #[inline]
    pub const fn octets(self) -> [u8; 16] {
        self.0
    }

    /// The eight 16-bit groups, host order.
    pub fn segments(self) -> [u16; 8] {
        let mut groups = [0u16; 8];
        for (i, group) in groups.iter_mut().enumerate() {
            *group = u16::from_be_bytes([self.0[2 * i], self.0[2 * i + 1]]);
        }
        groups
    }

    pub const fn is_unspecified(self) -> bool {
        matches!(self, Self::UNSPECIFIED)
    }

    pub const fn is_loopback(self) -> bool {
        matches!(self, Self::LOCALHOST)
    }

    /// Parse IPv6 literal text.
    ///
    /// # Errors
    /// * `EINVAL` - Text is not a valid IPv6 address
    pub fn parse(text: &str) -> Result<Self> {
        let mut addr: libc::in6_addr = unsafe { mem::zeroed() };
        pton(
            AddressFamily::INET6,
            text,
            (&mut addr as *mut libc::in6_addr).cast(),
        )?;
        Ok(Self(addr.s6_addr))
    }

    pub(crate) const fn to_in6_addr(self) -> libc::in6_addr {
        libc::in6_addr { s6_addr: self.0 }
    }
}

impl core::str::FromStr for Ipv6Addr {
    type Err = Errno;

    fn from_str(text: &str) -> Result<Self> {
        Self::parse(text)
    }
}

impl fmt::Display for Ipv6Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr = self.to_in6_addr();
        let mut buf = [0 as c_char; V6_TEXT_MAX];
        f.write_str(ntop(
            AddressFamily::INET6,
            (&addr as *const libc::in6_addr).cast(),
            &mut buf,
        ))
    }
}

/// An IPv4 endpoint: address plus port, port in host order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SocketAddrV4 {
    addr: Ipv4Addr,
    port: u16,
}

impl SocketAddrV4 {
    pub const fn new(addr: Ipv4Addr, port: u16) -> Self {
        Self { addr, port }
    }

    pub const fn addr(self) -> Ipv4Addr {
        self.addr
    }

    pub const fn port(self) -> u16 {
        self.port
    }
}

impl fmt::Display for SocketAddrV4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

/// An IPv6 endpoint. Flow info and scope id are not modeled; they encode as
/// zero.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SocketAddrV6 {
    addr: Ipv6Addr,
    port: u16,
}

impl SocketAddrV6 {
    pub const fn new(addr: Ipv6Addr, port: u16) -> Self {
        Self { addr, port }
    }

    pub const fn addr(self) -> Ipv6Addr {
        self.addr
    }

    pub const fn port(self) -> u16 {
        self.port
    }
}

impl fmt::Display for SocketAddrV6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]:{}", self.addr, self.port)
    }
}

const SUN_PATH_OFFSET: usize = mem::offset_of!(libc::sockaddr_un, sun_path);
const SUN_PATH_CAP: usize = size_of::<libc::sockaddr_un>() - SUN_PATH_OFFSET;

/// A local (filesystem-path) socket address.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnixAddr {
    path: PathBuf,
}

impl UnixAddr {
    /// Longest path that fits the kernel block with its terminating NUL.
    pub const MAX_PATH_LEN: usize = SUN_PATH_CAP - 1;

    /// Wrap a path. Length is checked when the address is encoded, not here.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for UnixAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// A socket endpoint of any supported family.
///
/// A closed set on purpose: the kernel's family field is a closed
/// enumeration, and encode/decode dispatch on exactly these tags.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SocketAddr {
    Unix(UnixAddr),
    V4(SocketAddrV4),
    V6(SocketAddrV6),
}

impl SocketAddr {
    /// Convenience for the common IPv4 endpoint.
    pub const fn v4(addr: Ipv4Addr, port: u16) -> Self {
        Self::V4(SocketAddrV4::new(addr, port))
    }

    /// Convenience for an IPv6 endpoint.
    pub const fn v6(addr: Ipv6Addr, port: u16) -> Self {
        Self::V6(SocketAddrV6::new(addr, port))
    }

    /// Convenience for a local path endpoint.
    pub fn unix(path: impl Into<PathBuf>) -> Self {
        Self::Unix(UnixAddr::new(path))
    }

    /// The family discriminant this address encodes under.
    pub const fn family(&self) -> AddressFamily {
        match self {
            Self::Unix(_) => AddressFamily::UNIX,
            Self::V4(_) => AddressFamily::INET,
            Self::V6(_) => AddressFamily::INET6,
        }
    }

    /// Encode into the kernel's byte block.
    ///
    /// # Errors
    /// * `ENAMETOOLONG` - Local path longer than [`UnixAddr::MAX_PATH_LEN`];
    ///   paths are never truncated
    /// * `EINVAL` - Local path contains an interior NUL
    pub fn to_raw(&self) -> Result<RawSocketAddr> {
        let mut raw = RawSocketAddr::zeroed();
        match self {
            Self::Unix(unix) => {
                let bytes = unix.path.as_os_str().as_bytes();
                if bytes.contains(&0) {
                    return Err(Errno::EINVAL);
                }
                if bytes.len() > UnixAddr::MAX_PATH_LEN {
                    return Err(Errno::ENAMETOOLONG);
                }
                let mut sun: libc::sockaddr_un = unsafe { mem::zeroed() };
                sun.sun_family = AddressFamily::UNIX.sa_family();
                for (dst, src) in sun.sun_path.iter_mut().zip(bytes) {
                    *dst = *src as c_char;
                }
                raw.write(sun, SUN_PATH_OFFSET + bytes.len() + 1);
            }
            Self::V4(v4) => {
                let mut sin: libc::sockaddr_in = unsafe { mem::zeroed() };
                sin.sin_family = AddressFamily::INET.sa_family();
                sin.sin_port = v4.port.to_be();
                sin.sin_addr = v4.addr.to_in_addr();
                raw.write(sin, size_of::<libc::sockaddr_in>());
            }
            Self::V6(v6) => {
                let mut sin6: libc::sockaddr_in6 = unsafe { mem::zeroed() };
                sin6.sin6_family = AddressFamily::INET6.sa_family();
                sin6.sin6_port = v6.port.to_be();
                sin6.sin6_addr = v6.addr.to_in6_addr();
                raw.write(sin6, size_of::<libc::sockaddr_in6>());
            }
        }
        Ok(raw)
    }

    /// Decode a kernel byte block back into a typed address.
    ///
    /// # Errors
    /// * `EAFNOSUPPORT` - Family outside the supported set
    /// * `EINVAL` - Block shorter than its family's layout
    pub fn from_raw(raw: &RawSocketAddr) -> Result<Self> {
        match raw.family().raw() {
            libc::AF_UNIX => {
                let len = raw.len() as usize;
                if len < size_of::<sa_family_t>() {
                    return Err(Errno::EINVAL);
                }
                let sun: libc::sockaddr_un = unsafe { raw.read() };
                let area = len.saturating_sub(SUN_PATH_OFFSET).min(SUN_PATH_CAP);
                let bytes: Vec<u8> = sun.sun_path[..area]
                    .iter()
                    .map(|&c| c as u8)
                    .take_while(|&b| b != 0)
                    .collect();
                Ok(Self::Unix(UnixAddr::new(PathBuf::from(
                    OsString::from_vec(bytes),
                ))))
            }
            libc::AF_INET => {
                if (raw.len() as usize) < size_of::<libc::sockaddr_in>() {
                    return Err(Errno::EINVAL);
                }
                let sin: libc::sockaddr_in = unsafe { raw.read() };
                Ok(Self::v4(
                    Ipv4Addr::from_in_addr(sin.sin_addr),
                    u16::from_be(sin.sin_port),
                ))
            }
            libc::AF_INET6 => {
                if (raw.len() as usize) < size_of::<libc::sockaddr_in6>() {
                    return Err(Errno::EINVAL);
                }
                let sin6: libc::sockaddr_in6 = unsafe { raw.read() };
                Ok(Self::v6(
                    Ipv6Addr::from_octets(sin6.sin6_addr.s6_addr),
                    u16::from_be(sin6.sin6_port),
                ))
            }
            _ => Err(Errno::EAFNOSUPPORT),
        }
    }
}

impl fmt::Display for SocketAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix(addr) => addr.fmt(f),
            Self::V4(addr) => addr.fmt(f),
            Self::V6(addr) => addr.fmt(f),
        }
    }
}

impl From<SocketAddrV4> for SocketAddr {
    fn from(addr: SocketAddrV4) -> Self {
        Self::V4(addr)
    }
}

impl From<SocketAddrV6> for SocketAddr {
    fn from(addr: SocketAddrV6) -> Self {
        Self::V6(addr)
    }
}

impl From<UnixAddr> for SocketAddr {
    fn from(addr: UnixAddr) -> Self {
        Self::Unix(addr)
    }
}

/// Kernel-layout socket address block: storage wide enough for any family,
/// plus the live byte length.
#[derive(Clone, Copy)]
pub struct RawSocketAddr {
    storage: libc::sockaddr_storage,
    len: socklen_t,
}

impl RawSocketAddr {
    /// An empty block with the full storage zeroed.
    pub fn zeroed() -> Self {
        Self {
            storage: unsafe { mem::zeroed() },
            len: 0,
        }
    }

    /// Widest block the kernel can hand back.
    pub const fn capacity() -> socklen_t {
        size_of::<libc::sockaddr_storage>() as socklen_t
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::from_raw(self.storage.ss_family as c_int)
    }

    pub const fn len(&self) -> socklen_t {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn as_ptr(&self) -> *const libc::sockaddr {
        (&self.storage as *const libc::sockaddr_storage).cast()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut libc::sockaddr {
        (&mut self.storage as *mut libc::sockaddr_storage).cast()
    }

    pub(crate) fn set_len(&mut self, len: socklen_t) {
        self.len = len.min(Self::capacity());
    }

    fn write<T>(&mut self, value: T, len: usize) {
        const {
            // Anything written here must fit the storage union.
            assert!(size_of::<T>() <= size_of::<libc::sockaddr_storage>());
        }
        unsafe { ptr::write((&mut self.storage as *mut libc::sockaddr_storage).cast::<T>(), value) };
        self.len = len as socklen_t;
    }

    /// # Safety
    ///
    /// The storage must hold a valid `T` for the current family.
    unsafe fn read<T>(&self) -> T {
        unsafe { ptr::read((&self.storage as *const libc::sockaddr_storage).cast::<T>()) }
    }

    #[cfg(test)]
    pub(crate) fn set_family(&mut self, family: sa_family_t) {
        self.storage.ss_family = family;
    }

    #[cfg(test)]
    pub(crate) fn force_len(&mut self, len: socklen_t) {
        self.len = len;
    }
}

impl fmt::Debug for RawSocketAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawSocketAddr({:?}, {} bytes)", self.family(), self.len)
    }
}
