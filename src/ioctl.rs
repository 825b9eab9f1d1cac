//! Device-control command words.
//!
//! Packs the Linux `asm-generic` ioctl layout into one word:
//!
//! ```text
//! bits  0..8   number     (8 bits)
//! bits  8..16  type tag   (8 bits)
//! bits 16..30  size       (14 bits)
//! bits 30..32  direction  (2 bits: none=0, write=1, read=2)
//! ```
//!
//! Every field is masked to its width before shifting, so overflow truncates
//! silently exactly like the kernel macro. Payload sizes are always taken
//! from the payload type itself; a hand-typed size that drifts from the real
//! struct is the kind of mismatch the kernel either rejects or silently
//! misreads.

use core::fmt;

use libc::{c_int, c_ulong};

use crate::call::nothing_or_errno;
use crate::errno::Result;
use crate::fd::FileDescriptor;
use crate::platform;

const NR_BITS: u32 = 8;
const TYPE_BITS: u32 = 8;
const SIZE_BITS: u32 = 14;
const DIR_BITS: u32 = 2;

const NR_SHIFT: u32 = 0;
const TYPE_SHIFT: u32 = NR_SHIFT + NR_BITS;
const SIZE_SHIFT: u32 = TYPE_SHIFT + TYPE_BITS;
const DIR_SHIFT: u32 = SIZE_SHIFT + SIZE_BITS;

const NR_MASK: u32 = (1 << NR_BITS) - 1;
const TYPE_MASK: u32 = (1 << TYPE_BITS) - 1;
const SIZE_MASK: u32 = (1 << SIZE_BITS) - 1;
const DIR_MASK: u32 = (1 << DIR_BITS) - 1;

/// Payload copy direction of a command, from the caller's point of view.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum Direction {
    /// No payload.
    None = 0,
    /// Caller hands the kernel a payload.
    Write = 1,
    /// Kernel fills the caller's payload.
    Read = 2,
    /// Both.
    ReadWrite = 3,
}

impl Direction {
    const fn from_bits(bits: u32) -> Self {
        match bits & DIR_MASK {
            0 => Self::None,
            1 => Self::Write,
            2 => Self::Read,
            _ => Self::ReadWrite,
        }
    }
}

/// A device-control command word.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct IoctlRequest(c_ulong);

impl IoctlRequest {
    #[inline]
    pub const fn from_raw(raw: c_ulong) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> c_ulong {
        self.0
    }

    pub const fn direction(self) -> Direction {
        Direction::from_bits((self.0 as u32) >> DIR_SHIFT)
    }

    pub const fn type_tag(self) -> u32 {
        ((self.0 as u32) >> TYPE_SHIFT) & TYPE_MASK
    }

    pub const fn number(self) -> u32 {
        ((self.0 as u32) >> NR_SHIFT) & NR_MASK
    }

    pub const fn payload_size(self) -> u32 {
        ((self.0 as u32) >> SIZE_SHIFT) & SIZE_MASK
    }
}

impl fmt::Debug for IoctlRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IoctlRequest({:#x}: dir={:?} type={:#x} nr={:#x} size={})",
            self.0,
            self.direction(),
            self.type_tag(),
            self.number(),
            self.payload_size()
        )
    }
}

/// Pack a command word from its four sub-fields.
pub const fn ioc(dir: Direction, ty: u32, nr: u32, size: u32) -> IoctlRequest {
    let word = (((dir as u32) & DIR_MASK) << DIR_SHIFT)
        | ((size & SIZE_MASK) << SIZE_SHIFT)
        | ((ty & TYPE_MASK) << TYPE_SHIFT)
        | ((nr & NR_MASK) << NR_SHIFT);
    IoctlRequest(word as c_ulong)
}

/// Command with no payload.
pub const fn io(ty: u32, nr: u32) -> IoctlRequest {
    ioc(Direction::None, ty, nr, 0)
}

/// Kernel-fills-payload command; size comes from `T` itself.
pub const fn ior<T>(ty: u32, nr: u32) -> IoctlRequest {
    ioc(Direction::Read, ty, nr, size_of::<T>() as u32)
}

/// Caller-supplies-payload command; size comes from `T` itself.
pub const fn iow<T>(ty: u32, nr: u32) -> IoctlRequest {
    ioc(Direction::Write, ty, nr, size_of::<T>() as u32)
}

/// Bidirectional command; size comes from `T` itself.
pub const fn iowr<T>(ty: u32, nr: u32) -> IoctlRequest {
    ioc(Direction::ReadWrite, ty, nr, size_of::<T>() as u32)
}

/// Payload type bound to one command word.
///
/// # Safety
///
/// `REQUEST`'s size field must equal `size_of::<Self>()`, and the type must
/// be plain `repr(C)` data valid for the kernel to read or fill per the
/// request's direction.
pub unsafe trait IoctlParameter: Sized {
    const REQUEST: IoctlRequest;
}

impl FileDescriptor {
    /// Issue a no-payload device command.
    ///
    /// # Errors
    ///
    /// Whatever the device driver reports; ENOTTY when the descriptor does
    /// not answer this request.
    pub fn ioctl(&self, request: IoctlRequest, retry_on_interrupt: bool) -> Result<()> {
        nothing_or_errno(retry_on_interrupt, || {
            platform::ioctl_bare(self.raw(), request.raw())
        })
    }

    /// Issue a command whose payload is one `c_int`, passed by pointer both
    /// directions. Returns the value the kernel left behind, which for
    /// read-direction requests is the answer.
    pub fn ioctl_int(
        &self,
        request: IoctlRequest,
        value: c_int,
        retry_on_interrupt: bool,
    ) -> Result<c_int> {
        let mut value = value;
        nothing_or_errno(retry_on_interrupt, || unsafe {
            platform::ioctl_arg(
                self.raw(),
                request.raw(),
                (&mut value as *mut c_int).cast(),
                size_of::<c_int>(),
            )
        })?;
        Ok(value)
    }

    /// Exchange `parameter` with the kernel under its bound command word.
    pub fn ioctl_value<T: IoctlParameter>(
        &self,
        parameter: &mut T,
        retry_on_interrupt: bool,
    ) -> Result<()> {
        unsafe { self.ioctl_with(T::REQUEST, parameter, retry_on_interrupt) }
    }

    /// Exchange `payload` under an explicit command word, for the occasional
    /// payload type that answers more than one request.
    ///
    /// # Safety
    ///
    /// `T`'s layout must be the payload layout the driver expects for
    /// `request`.
    pub unsafe fn ioctl_with<T>(
        &self,
        request: IoctlRequest,
        payload: &mut T,
        retry_on_interrupt: bool,
    ) -> Result<()> {
        nothing_or_errno(retry_on_interrupt, || unsafe {
            platform::ioctl_arg(
                self.raw(),
                request.raw(),
                (payload as *mut T).cast(),
                size_of::<T>(),
            )
        })
    }
}
