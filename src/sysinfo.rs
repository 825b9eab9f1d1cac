//! Static facts about the running system.

use crate::call::value_or_errno;
use crate::errno::Result;
use crate::platform;

/// The virtual memory page size in bytes.
pub fn page_size() -> Result<usize> {
    value_or_errno(false, || platform::page_size()).map(|n| n as usize)
}
