//! Would-block retry with cooperative suspension.
//!
//! The async counterpart of the EINTR loop in [`crate::call`]: operations on
//! descriptors in non-blocking mode fail with a small family of transient
//! codes (would-block, in-progress, already-in-progress) instead of blocking
//! the thread. [`retry_while_blocking`] classifies those via
//! [`Errno::is_blocking`], suspends the task for the policy's interval, and
//! re-issues the operation. Everything outside the family returns
//! immediately. Retries of one call-site stay in issue order; concurrent
//! call-sites share nothing but the timer thread.

use std::time::Duration;

use crate::errno::{Errno, Result};
use crate::suspend::{self, CancelToken};

/// Per-invocation policy for [`retry_while_blocking`]: how long to suspend
/// between attempts, and the flag that can call the loop off.
#[derive(Clone, Debug)]
pub struct BlockRetry {
    pub interval: Duration,
    pub cancel: CancelToken,
}

impl BlockRetry {
    /// Suspension interval used when the caller does not pick one.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_nanos(1000);

    pub fn new() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            cancel: CancelToken::new(),
        }
    }

    /// Handle for cancelling from another task or thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
}

impl Default for BlockRetry {
    fn default() -> Self {
        Self::new()
    }
}

/// Re-issue `op` while it fails with a blocking-class code.
///
/// `op` is expected to be interruption-safe already (built on
/// [`crate::call::value_or_errno`]). On a blocking-class failure the task
/// suspends cooperatively for `policy.interval`, leaving the thread free for
/// other work, and cancellation is checked before every retry; a cancelled
/// loop surfaces [`Errno::ECANCELED`] within one suspension interval. Any
/// other outcome, success or failure, is returned as is.
pub async fn retry_while_blocking<T, F>(policy: &BlockRetry, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    loop {
        match op() {
            Err(e) if e.is_blocking() => {
                suspend::sleep(policy.interval).await;
                if policy.cancel.is_cancelled() {
                    return Err(Errno::ECANCELED);
                }
            }
            other => return other,
        }
    }
}
