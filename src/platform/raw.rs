//! Raw kernel entry points, one shim per call.
//!
//! Single source of truth for the crate's FFI surface. Shims mirror the C
//! signatures, do no errno interpretation, and apply no policy; the typed
//! wrappers above them own both. Shims that policy tests script consult the
//! [`super::mock`] driver first; pure converters (address text, broken-down
//! time) always reach the real platform.

use core::ffi::CStr;

use libc::{
    c_char, c_int, c_long, c_ulong, c_void, clockid_t, mode_t, off_t, sighandler_t, sigset_t,
    size_t, sockaddr, socklen_t, time_t, timespec, timeval, tm,
};

#[cfg(test)]
use super::mock;

#[cfg(test)]
fn struct_bytes<T>(value: &T) -> &[u8] {
    // Captured into the mock trace so tests can pin exactly what was handed
    // to the kernel.
    unsafe { core::slice::from_raw_parts((value as *const T).cast::<u8>(), size_of::<T>()) }
}

// ===== errno slot =====

#[cfg(any(target_os = "linux", target_os = "android"))]
fn errno_location() -> *mut c_int {
    unsafe { libc::__errno_location() }
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
fn errno_location() -> *mut c_int {
    unsafe { libc::__error() }
}

/// Read the calling thread's errno slot.
pub(crate) fn errno() -> c_int {
    #[cfg(test)]
    if let Some(value) = mock::errno_override() {
        return value;
    }
    unsafe { *errno_location() }
}

/// Overwrite the calling thread's errno slot.
pub(crate) fn set_errno(value: c_int) {
    #[cfg(test)]
    if mock::set_errno_override(value) {
        return;
    }
    unsafe { *errno_location() = value }
}

// ===== file descriptors =====

pub(crate) fn open(path: &CStr, flags: c_int, mode: mode_t) -> c_int {
    unsafe { libc::open(path.as_ptr(), flags, mode as libc::c_uint) }
}

pub(crate) fn close(fd: c_int) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept("close", &[fd as i64], None, None) {
        return ret as c_int;
    }
    unsafe { libc::close(fd) }
}

pub(crate) fn read(fd: c_int, buf: &mut [u8]) -> isize {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "read",
        &[fd as i64, buf.len() as i64],
        None,
        Some((buf.as_mut_ptr(), buf.len())),
    ) {
        return ret as isize;
    }
    unsafe { libc::read(fd, buf.as_mut_ptr().cast::<c_void>(), buf.len() as size_t) }
}

pub(crate) fn write(fd: c_int, buf: &[u8]) -> isize {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept("write", &[fd as i64, buf.len() as i64], Some(buf), None)
    {
        return ret as isize;
    }
    unsafe { libc::write(fd, buf.as_ptr().cast::<c_void>(), buf.len() as size_t) }
}

pub(crate) fn pread(fd: c_int, buf: &mut [u8], offset: off_t) -> isize {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "pread",
        &[fd as i64, buf.len() as i64, offset as i64],
        None,
        Some((buf.as_mut_ptr(), buf.len())),
    ) {
        return ret as isize;
    }
    unsafe {
        libc::pread(
            fd,
            buf.as_mut_ptr().cast::<c_void>(),
            buf.len() as size_t,
            offset,
        )
    }
}

pub(crate) fn pwrite(fd: c_int, buf: &[u8], offset: off_t) -> isize {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "pwrite",
        &[fd as i64, buf.len() as i64, offset as i64],
        Some(buf),
        None,
    ) {
        return ret as isize;
    }
    unsafe {
        libc::pwrite(
            fd,
            buf.as_ptr().cast::<c_void>(),
            buf.len() as size_t,
            offset,
        )
    }
}

pub(crate) fn lseek(fd: c_int, offset: off_t, whence: c_int) -> off_t {
    unsafe { libc::lseek(fd, offset, whence) }
}

pub(crate) fn pipe(fds: &mut [c_int; 2]) -> c_int {
    unsafe { libc::pipe(fds.as_mut_ptr()) }
}

pub(crate) fn fcntl(fd: c_int, cmd: c_int, arg: c_int) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept("fcntl", &[fd as i64, cmd as i64, arg as i64], None, None)
    {
        return ret as c_int;
    }
    unsafe { libc::fcntl(fd, cmd, arg) }
}

// ===== device control =====

pub(crate) fn ioctl_bare(fd: c_int, request: c_ulong) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept("ioctl", &[fd as i64, request as i64], None, None) {
        return ret as c_int;
    }
    unsafe { libc::ioctl(fd, request as _) }
}

/// # Safety
///
/// `arg` must be valid for the request's direction and payload size.
pub(crate) unsafe fn ioctl_arg(fd: c_int, request: c_ulong, arg: *mut c_void, size: usize) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "ioctl",
        &[fd as i64, request as i64],
        None,
        Some((arg.cast::<u8>(), size)),
    ) {
        return ret as c_int;
    }
    let _ = size;
    unsafe { libc::ioctl(fd, request as _, arg) }
}

// ===== sockets =====

pub(crate) fn socket(domain: c_int, ty: c_int, protocol: c_int) -> c_int {
    unsafe { libc::socket(domain, ty, protocol) }
}

pub(crate) fn socketpair(domain: c_int, ty: c_int, protocol: c_int, fds: &mut [c_int; 2]) -> c_int {
    unsafe { libc::socketpair(domain, ty, protocol, fds.as_mut_ptr()) }
}

/// # Safety
///
/// `addr` must point to `len` valid bytes of a sockaddr block.
pub(crate) unsafe fn bind(fd: c_int, addr: *const sockaddr, len: socklen_t) -> c_int {
    unsafe { libc::bind(fd, addr, len) }
}

/// # Safety
///
/// `addr` must point to `len` valid bytes of a sockaddr block.
pub(crate) unsafe fn connect(fd: c_int, addr: *const sockaddr, len: socklen_t) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept("connect", &[fd as i64, len as i64], None, None) {
        return ret as c_int;
    }
    unsafe { libc::connect(fd, addr, len) }
}

pub(crate) fn listen(fd: c_int, backlog: c_int) -> c_int {
    unsafe { libc::listen(fd, backlog) }
}

/// # Safety
///
/// `addr` must be writable for `*len` bytes; `len` is updated to the live
/// address length.
pub(crate) unsafe fn accept(fd: c_int, addr: *mut sockaddr, len: *mut socklen_t) -> c_int {
    #[cfg(test)]
    if let Some((ret, wrote)) = mock::intercept(
        "accept",
        &[fd as i64],
        None,
        Some((addr.cast::<u8>(), unsafe { *len } as usize)),
    ) {
        unsafe { *len = wrote as socklen_t };
        return ret as c_int;
    }
    unsafe { libc::accept(fd, addr, len) }
}

/// # Safety
///
/// `addr` must be writable for `*len` bytes; `len` is updated to the live
/// address length.
pub(crate) unsafe fn getsockname(fd: c_int, addr: *mut sockaddr, len: *mut socklen_t) -> c_int {
    unsafe { libc::getsockname(fd, addr, len) }
}

/// # Safety
///
/// `value` must point to `len` valid bytes.
pub(crate) unsafe fn setsockopt(
    fd: c_int,
    level: c_int,
    name: c_int,
    value: *const c_void,
    len: socklen_t,
) -> c_int {
    #[cfg(test)]
    {
        let input = unsafe { core::slice::from_raw_parts(value.cast::<u8>(), len as usize) };
        if let Some((ret, _)) = mock::intercept(
            "setsockopt",
            &[fd as i64, level as i64, name as i64, len as i64],
            Some(input),
            None,
        ) {
            return ret as c_int;
        }
    }
    unsafe { libc::setsockopt(fd, level, name, value, len) }
}

/// # Safety
///
/// `value` must be writable for `*len` bytes; `len` is updated to the length
/// the kernel filled.
pub(crate) unsafe fn getsockopt(
    fd: c_int,
    level: c_int,
    name: c_int,
    value: *mut c_void,
    len: *mut socklen_t,
) -> c_int {
    #[cfg(test)]
    if let Some((ret, wrote)) = mock::intercept(
        "getsockopt",
        &[fd as i64, level as i64, name as i64],
        None,
        Some((value.cast::<u8>(), unsafe { *len } as usize)),
    ) {
        unsafe { *len = wrote as socklen_t };
        return ret as c_int;
    }
    unsafe { libc::getsockopt(fd, level, name, value, len) }
}

pub(crate) fn send(fd: c_int, buf: &[u8], flags: c_int) -> isize {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "send",
        &[fd as i64, buf.len() as i64, flags as i64],
        Some(buf),
        None,
    ) {
        return ret as isize;
    }
    unsafe { libc::send(fd, buf.as_ptr().cast::<c_void>(), buf.len() as size_t, flags) }
}

pub(crate) fn recv(fd: c_int, buf: &mut [u8], flags: c_int) -> isize {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "recv",
        &[fd as i64, buf.len() as i64, flags as i64],
        None,
        Some((buf.as_mut_ptr(), buf.len())),
    ) {
        return ret as isize;
    }
    unsafe {
        libc::recv(
            fd,
            buf.as_mut_ptr().cast::<c_void>(),
            buf.len() as size_t,
            flags,
        )
    }
}

/// # Safety
///
/// `addr` must point to `len` valid bytes of a sockaddr block.
pub(crate) unsafe fn sendto(
    fd: c_int,
    buf: &[u8],
    flags: c_int,
    addr: *const sockaddr,
    len: socklen_t,
) -> isize {
    unsafe {
        libc::sendto(
            fd,
            buf.as_ptr().cast::<c_void>(),
            buf.len() as size_t,
            flags,
            addr,
            len,
        )
    }
}

/// # Safety
///
/// `addr` must be writable for `*len` bytes; `len` is updated to the live
/// address length.
pub(crate) unsafe fn recvfrom(
    fd: c_int,
    buf: &mut [u8],
    flags: c_int,
    addr: *mut sockaddr,
    len: *mut socklen_t,
) -> isize {
    unsafe {
        libc::recvfrom(
            fd,
            buf.as_mut_ptr().cast::<c_void>(),
            buf.len() as size_t,
            flags,
            addr,
            len,
        )
    }
}

pub(crate) fn shutdown(fd: c_int, how: c_int) -> c_int {
    unsafe { libc::shutdown(fd, how) }
}

// ===== address text conversion =====

// The libc crate does not bind inet_pton/inet_ntop on this platform; the C
// library exports them, so declare the symbols here.
mod inet {
    use libc::{c_char, c_int, c_void, socklen_t};

    unsafe extern "C" {
        pub(super) fn inet_pton(af: c_int, src: *const c_char, dst: *mut c_void) -> c_int;
        pub(super) fn inet_ntop(
            af: c_int,
            src: *const c_void,
            dst: *mut c_char,
            size: socklen_t,
        ) -> *const c_char;
    }
}

/// # Safety
///
/// `dst` must be writable for the binary address size of `family`.
pub(crate) unsafe fn inet_pton(family: c_int, text: &CStr, dst: *mut c_void) -> c_int {
    unsafe { inet::inet_pton(family, text.as_ptr(), dst) }
}

/// # Safety
///
/// `src` must point to a binary address of `family`; `dst` must be writable
/// for `size` bytes.
pub(crate) unsafe fn inet_ntop(
    family: c_int,
    src: *const c_void,
    dst: *mut c_char,
    size: socklen_t,
) -> *const c_char {
    unsafe { inet::inet_ntop(family, src, dst, size) }
}

// ===== time =====

pub(crate) fn gettimeofday(tv: &mut timeval) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "gettimeofday",
        &[],
        None,
        Some(((tv as *mut timeval).cast::<u8>(), size_of::<timeval>())),
    ) {
        return ret as c_int;
    }
    unsafe { libc::gettimeofday(tv, core::ptr::null_mut()) }
}

pub(crate) fn settimeofday(tv: &timeval) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept("settimeofday", &[], Some(struct_bytes(tv)), None) {
        return ret as c_int;
    }
    unsafe { libc::settimeofday(tv, core::ptr::null()) }
}

pub(crate) fn clock_gettime(clock: clockid_t, ts: &mut timespec) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "clock_gettime",
        &[clock as i64],
        None,
        Some(((ts as *mut timespec).cast::<u8>(), size_of::<timespec>())),
    ) {
        return ret as c_int;
    }
    unsafe { libc::clock_gettime(clock, ts) }
}

pub(crate) fn clock_getres(clock: clockid_t, ts: &mut timespec) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "clock_getres",
        &[clock as i64],
        None,
        Some(((ts as *mut timespec).cast::<u8>(), size_of::<timespec>())),
    ) {
        return ret as c_int;
    }
    unsafe { libc::clock_getres(clock, ts) }
}

pub(crate) fn clock_settime(clock: clockid_t, ts: &timespec) -> c_int {
    #[cfg(test)]
    if let Some((ret, _)) = mock::intercept(
        "clock_settime",
        &[clock as i64],
        Some(struct_bytes(ts)),
        None,
    ) {
        return ret as c_int;
    }
    unsafe { libc::clock_settime(clock, ts) }
}

/// Broken-down UTC time. Returns false when the instant is not representable.
pub(crate) fn gmtime_r(time: &time_t, out: &mut tm) -> bool {
    !unsafe { libc::gmtime_r(time, out) }.is_null()
}

/// Broken-down local time. Returns false when the instant is not representable.
pub(crate) fn localtime_r(time: &time_t, out: &mut tm) -> bool {
    !unsafe { libc::localtime_r(time, out) }.is_null()
}

/// Calendar to epoch seconds, fields interpreted as UTC. Normalizes `tm`.
pub(crate) fn timegm(tm: &mut tm) -> time_t {
    unsafe { libc::timegm(tm) }
}

/// Calendar to epoch seconds, fields interpreted in the local zone.
/// Normalizes `tm` and resolves `tm_isdst`.
pub(crate) fn mktime(tm: &mut tm) -> time_t {
    unsafe { libc::mktime(tm) }
}

// ===== signals =====

/// # Safety
///
/// `act`, when non-null, must carry a handler that stays valid for as long as
/// it can be invoked; `old` must be writable when non-null.
pub(crate) unsafe fn sigaction(
    sig: c_int,
    act: *const libc::sigaction,
    old: *mut libc::sigaction,
) -> c_int {
    unsafe { libc::sigaction(sig, act, old) }
}

pub(crate) fn signal(sig: c_int, handler: sighandler_t) -> sighandler_t {
    unsafe { libc::signal(sig, handler) }
}

pub(crate) fn raise(sig: c_int) -> c_int {
    unsafe { libc::raise(sig) }
}

pub(crate) fn sigemptyset(set: &mut sigset_t) -> c_int {
    unsafe { libc::sigemptyset(set) }
}

pub(crate) fn sigfillset(set: &mut sigset_t) -> c_int {
    unsafe { libc::sigfillset(set) }
}

pub(crate) fn sigaddset(set: &mut sigset_t, sig: c_int) -> c_int {
    unsafe { libc::sigaddset(set, sig) }
}

pub(crate) fn sigdelset(set: &mut sigset_t, sig: c_int) -> c_int {
    unsafe { libc::sigdelset(set, sig) }
}

pub(crate) fn sigismember(set: &sigset_t, sig: c_int) -> c_int {
    unsafe { libc::sigismember(set, sig) }
}

// ===== system info =====

pub(crate) fn page_size() -> c_long {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) }
}
