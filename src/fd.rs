//! File descriptor operations.
//!
//! [`FileDescriptor`] is a plain `Copy` value over the raw descriptor
//! number: dropping it does nothing and closing is explicit, exactly like
//! the integer it wraps. Every blocking wrapper takes `retry_on_interrupt`
//! and routes through [`crate::call`]; the async variants add the
//! would-block loop from [`crate::nonblock`] on top.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use bitflags::bitflags;
use libc::{c_int, mode_t, off_t};

use crate::call::{nothing_or_errno, value_or_errno};
use crate::errno::{Errno, Result};
use crate::nonblock::{BlockRetry, retry_while_blocking};
use crate::platform;

/// Raw descriptor number.
pub type RawFd = c_int;

bitflags! {
    /// open(2) flags: access mode plus status bits. The status subset is also
    /// what F_GETFL reports and F_SETFL accepts.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct OpenFlags: c_int {
        const RDONLY = libc::O_RDONLY;
        const WRONLY = libc::O_WRONLY;
        const RDWR = libc::O_RDWR;
        const APPEND = libc::O_APPEND;
        const CREAT = libc::O_CREAT;
        const EXCL = libc::O_EXCL;
        const TRUNC = libc::O_TRUNC;
        const NONBLOCK = libc::O_NONBLOCK;
        const CLOEXEC = libc::O_CLOEXEC;
        const NOCTTY = libc::O_NOCTTY;
        const DIRECTORY = libc::O_DIRECTORY;
        const NOFOLLOW = libc::O_NOFOLLOW;
    }

    /// Per-descriptor flags (F_GETFD/F_SETFD).
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct FdFlags: c_int {
        const CLOEXEC = libc::FD_CLOEXEC;
    }

    /// Permission bits for newly created files.
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct Mode: mode_t {
        const RUSR = libc::S_IRUSR;
        const WUSR = libc::S_IWUSR;
        const XUSR = libc::S_IXUSR;
        const RGRP = libc::S_IRGRP;
        const WGRP = libc::S_IWGRP;
        const XGRP = libc::S_IXGRP;
        const ROTH = libc::S_IROTH;
        const WOTH = libc::S_IWOTH;
        const XOTH = libc::S_IXOTH;
        const SUID = libc::S_ISUID;
        const SGID = libc::S_ISGID;
        const SVTX = libc::S_ISVTX;
    }
}

/// Seek origin for [`FileDescriptor::seek`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(i32)]
pub enum Whence {
    Set = libc::SEEK_SET,
    Current = libc::SEEK_CUR,
    End = libc::SEEK_END,
}

/// A raw file descriptor as a typed value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(transparent)]
pub struct FileDescriptor(RawFd);

fn path_cstring(path: &Path) -> Result<CString> {
    // Interior NUL cannot reach the kernel; reject it the way the converter
    // itself would.
    CString::new(path.as_os_str().as_bytes()).map_err(|_| Errno::EINVAL)
}

impl FileDescriptor {
    pub const STDIN: Self = Self(0);
    pub const STDOUT: Self = Self(1);
    pub const STDERR: Self = Self(2);

    #[inline]
    pub const fn from_raw(raw: RawFd) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> RawFd {
        self.0
    }

    /// Open a file by path.
    ///
    /// # Errors
    /// * `ENOENT` - File not found and `CREAT` not requested
    /// * `EACCES` - Permission denied
    /// * `EINVAL` - Path contains an interior NUL
    pub fn open(
        path: impl AsRef<Path>,
        flags: OpenFlags,
        mode: Mode,
        retry_on_interrupt: bool,
    ) -> Result<Self> {
        let path = path_cstring(path.as_ref())?;
        value_or_errno(retry_on_interrupt, || {
            platform::open(&path, flags.bits(), mode.bits())
        })
        .map(Self)
    }

    /// Close the descriptor.
    ///
    /// Never retries on EINTR: descriptor state after an interrupted close is
    /// unspecified, and a retry could close a recycled descriptor.
    ///
    /// # Errors
    /// * `EBADF` - Not an open descriptor
    pub fn close(self) -> Result<()> {
        nothing_or_errno(false, || platform::close(self.0))
    }

    /// Read into `buf`.
    ///
    /// # Returns
    /// Number of bytes read; 0 at end of file.
    ///
    /// # Errors
    /// * `EBADF` - Not open for reading
    /// * `EAGAIN` - Non-blocking mode and nothing to read yet
    pub fn read(&self, buf: &mut [u8], retry_on_interrupt: bool) -> Result<usize> {
        value_or_errno(retry_on_interrupt, || platform::read(self.0, buf)).map(|n| n as usize)
    }

    /// Write from `buf`.
    ///
    /// # Returns
    /// Number of bytes written, which may be short.
    ///
    /// # Errors
    /// * `EBADF` - Not open for writing
    /// * `EPIPE` - Reading side is gone
    /// * `ENOSPC` - No space left on device
    pub fn write(&self, buf: &[u8], retry_on_interrupt: bool) -> Result<usize> {
        value_or_errno(retry_on_interrupt, || platform::write(self.0, buf)).map(|n| n as usize)
    }

    /// Read into `buf` at `offset` without moving the file cursor.
    pub fn pread(&self, buf: &mut [u8], offset: off_t, retry_on_interrupt: bool) -> Result<usize> {
        value_or_errno(retry_on_interrupt, || platform::pread(self.0, buf, offset))
            .map(|n| n as usize)
    }

    /// Write `buf` at `offset` without moving the file cursor.
    pub fn pwrite(&self, buf: &[u8], offset: off_t, retry_on_interrupt: bool) -> Result<usize> {
        value_or_errno(retry_on_interrupt, || platform::pwrite(self.0, buf, offset))
            .map(|n| n as usize)
    }

    /// Move the file cursor.
    ///
    /// # Returns
    /// The new cursor position from the start of the file.
    ///
    /// # Errors
    /// * `ESPIPE` - Descriptor is not seekable
    pub fn seek(&self, offset: off_t, whence: Whence) -> Result<off_t> {
        value_or_errno(false, || platform::lseek(self.0, offset, whence as c_int))
    }

    /// Create a pipe.
    ///
    /// # Returns
    /// `(read end, write end)`.
    pub fn pipe() -> Result<(Self, Self)> {
        let mut fds: [RawFd; 2] = [0; 2];
        nothing_or_errno(false, || platform::pipe(&mut fds))?;
        Ok((Self(fds[0]), Self(fds[1])))
    }

    /// Duplicate onto the lowest free descriptor at or above `min`.
    ///
    /// Both descriptors share one open file description; flags set with
    /// F_SETFL are shared, FD_CLOEXEC is per descriptor.
    pub fn duplicate(&self, min: RawFd, close_on_exec: bool) -> Result<Self> {
        let cmd = if close_on_exec {
            libc::F_DUPFD_CLOEXEC
        } else {
            libc::F_DUPFD
        };
        value_or_errno(false, || platform::fcntl(self.0, cmd, min)).map(Self)
    }

    /// Per-descriptor flags (F_GETFD).
    pub fn fd_flags(&self) -> Result<FdFlags> {
        value_or_errno(false, || platform::fcntl(self.0, libc::F_GETFD, 0))
            .map(FdFlags::from_bits_retain)
    }

    /// Replace the per-descriptor flags (F_SETFD).
    pub fn set_fd_flags(&self, flags: FdFlags) -> Result<()> {
        nothing_or_errno(false, || platform::fcntl(self.0, libc::F_SETFD, flags.bits()))
    }

    /// Status flags of the open file description (F_GETFL).
    pub fn status_flags(&self) -> Result<OpenFlags> {
        value_or_errno(false, || platform::fcntl(self.0, libc::F_GETFL, 0))
            .map(OpenFlags::from_bits_retain)
    }

    /// Replace the status flags (F_SETFL). Access mode and creation bits are
    /// ignored by the kernel.
    pub fn set_status_flags(&self, flags: OpenFlags) -> Result<()> {
        nothing_or_errno(false, || platform::fcntl(self.0, libc::F_SETFL, flags.bits()))
    }

    /// Toggle O_NONBLOCK, preserving the other status flags.
    pub fn set_nonblocking(&self, nonblocking: bool) -> Result<()> {
        let flags = self.status_flags()?;
        let flags = if nonblocking {
            flags | OpenFlags::NONBLOCK
        } else {
            flags - OpenFlags::NONBLOCK
        };
        self.set_status_flags(flags)
    }

    /// [`read`](Self::read) with the would-block retry loop, for descriptors
    /// in non-blocking mode. EINTR is retried inside every attempt.
    pub async fn read_async(&self, buf: &mut [u8], policy: &BlockRetry) -> Result<usize> {
        retry_while_blocking(policy, || self.read(buf, true)).await
    }

    /// [`write`](Self::write) with the would-block retry loop, for
    /// descriptors in non-blocking mode.
    pub async fn write_async(&self, buf: &[u8], policy: &BlockRetry) -> Result<usize> {
        retry_while_blocking(policy, || self.write(buf, true)).await
    }
}
