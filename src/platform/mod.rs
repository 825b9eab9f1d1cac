//! Platform call surface.
//!
//! Every raw kernel entry point the crate uses goes through exactly one shim
//! in [`raw`]; all FFI `unsafe` lives there. In test builds each shim first
//! offers the call to the scripted driver in [`mock`], so policy tests can
//! observe call sequences and inject failures without touching the kernel.

mod raw;

#[cfg(test)]
pub(crate) mod mock;

pub(crate) use raw::*;
