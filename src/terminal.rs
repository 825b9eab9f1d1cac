//! Terminal and pseudo-terminal device commands.
//!
//! Command words come from the platform headers where the platform defines
//! them; the pseudo-terminal pair is packed here with the same bit layout the
//! kernel uses. All of them go through the descriptor's ioctl surface, so a
//! non-terminal descriptor answers ENOTTY.

use libc::{c_int, c_ulong};

use crate::errno::Result;
use crate::fd::FileDescriptor;
use crate::ioctl::{IoctlParameter, IoctlRequest};

/// Start sending a break condition.
pub const SET_BREAK: IoctlRequest = IoctlRequest::from_raw(libc::TIOCSBRK as c_ulong);
/// Stop sending a break condition.
pub const CLEAR_BREAK: IoctlRequest = IoctlRequest::from_raw(libc::TIOCCBRK as c_ulong);
/// Refuse further opens of this terminal.
pub const EXCLUSIVE: IoctlRequest = IoctlRequest::from_raw(libc::TIOCEXCL as c_ulong);
/// Allow further opens again.
pub const NONEXCLUSIVE: IoctlRequest = IoctlRequest::from_raw(libc::TIOCNXCL as c_ulong);
/// Read the line discipline number.
pub const GET_LINE_DISCIPLINE: IoctlRequest = IoctlRequest::from_raw(libc::TIOCGETD as c_ulong);
/// Change the line discipline number.
pub const SET_LINE_DISCIPLINE: IoctlRequest = IoctlRequest::from_raw(libc::TIOCSETD as c_ulong);
/// Read the window size into a [`WindowSize`].
pub const GET_WINDOW_SIZE: IoctlRequest = IoctlRequest::from_raw(libc::TIOCGWINSZ as c_ulong);
/// Set the window size from a [`WindowSize`].
pub const SET_WINDOW_SIZE: IoctlRequest = IoctlRequest::from_raw(libc::TIOCSWINSZ as c_ulong);
/// Read the replica index behind a pseudo-terminal primary.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const PTY_NUMBER: IoctlRequest = IoctlRequest::from_raw(libc::TIOCGPTN as c_ulong);
/// Lock or unlock a pseudo-terminal replica.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub const PTY_LOCK: IoctlRequest = IoctlRequest::from_raw(libc::TIOCSPTLCK as c_ulong);

/// Terminal dimensions in character cells and, where drivers report them,
/// pixels.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct WindowSize {
    pub rows: u16,
    pub columns: u16,
    pub x_pixels: u16,
    pub y_pixels: u16,
}

// Field-for-field the kernel's winsize, which is what GET_WINDOW_SIZE fills.
unsafe impl IoctlParameter for WindowSize {
    const REQUEST: IoctlRequest = GET_WINDOW_SIZE;
}

impl FileDescriptor {
    /// The terminal's current dimensions.
    ///
    /// # Errors
    /// * `ENOTTY` - Descriptor is not a terminal
    pub fn window_size(&self) -> Result<WindowSize> {
        let mut size = WindowSize::default();
        self.ioctl_value(&mut size, false)?;
        Ok(size)
    }

    /// Resize the terminal. Foreground processes see SIGWINCH.
    pub fn set_window_size(&self, size: WindowSize) -> Result<()> {
        let mut size = size;
        unsafe { self.ioctl_with(SET_WINDOW_SIZE, &mut size, false) }
    }

    /// Start or stop a break condition on the line.
    pub fn set_break(&self, on: bool) -> Result<()> {
        self.ioctl(if on { SET_BREAK } else { CLEAR_BREAK }, false)
    }

    /// Claim or release exclusive use of the terminal.
    pub fn set_exclusive(&self, on: bool) -> Result<()> {
        self.ioctl(if on { EXCLUSIVE } else { NONEXCLUSIVE }, false)
    }

    /// The terminal's line discipline number.
    pub fn line_discipline(&self) -> Result<c_int> {
        self.ioctl_int(GET_LINE_DISCIPLINE, 0, false)
    }

    /// Switch the terminal to line discipline `discipline`.
    pub fn set_line_discipline(&self, discipline: c_int) -> Result<()> {
        self.ioctl_int(SET_LINE_DISCIPLINE, discipline, false)
            .map(|_| ())
    }

    /// The replica index behind this pseudo-terminal primary, as in
    /// `/dev/pts/N`.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub fn pty_number(&self) -> Result<c_int> {
        self.ioctl_int(PTY_NUMBER, 0, false)
    }

    /// Lock or unlock this primary's replica device.
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub fn set_pty_lock(&self, locked: bool) -> Result<()> {
        self.ioctl_int(PTY_LOCK, locked as c_int, false).map(|_| ())
    }
}
