//! Scripted stand-in for the platform call surface, test builds only.
//!
//! A driver installed on the current thread answers shim calls from a queue
//! of [`Outcome`]s instead of entering the kernel, plants the errno the
//! accessor will read, and records a trace entry per call. Retry-policy tests
//! assert on call counts; contract tests assert on the exact bytes a shim was
//! handed (for example the timeval forwarded to the time-of-day setter).
//!
//! The driver is per-thread, so mocked and live-kernel tests run side by side
//! under the parallel test harness.

use std::cell::RefCell;
use std::collections::VecDeque;

use libc::c_int;

/// One scripted shim result.
#[derive(Clone, Debug)]
pub(crate) struct Outcome {
    ret: i64,
    errno: c_int,
    payload: Option<Vec<u8>>,
}

impl Outcome {
    /// Succeed with `ret`.
    pub(crate) fn ok(ret: i64) -> Self {
        Self {
            ret,
            errno: 0,
            payload: None,
        }
    }

    /// Fail with the sentinel return and `errno` planted for the accessor.
    pub(crate) fn fail(errno: crate::Errno) -> Self {
        Self {
            ret: -1,
            errno: errno.raw(),
            payload: None,
        }
    }

    /// Bytes the shim copies into its out parameter before returning.
    pub(crate) fn with_payload(mut self, bytes: &[u8]) -> Self {
        self.payload = Some(bytes.to_vec());
        self
    }
}

/// One intercepted call.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) name: &'static str,
    pub(crate) args: Vec<i64>,
    /// In-payload the caller handed to the kernel, when the shim captures one.
    pub(crate) bytes: Option<Vec<u8>>,
}

struct Driver {
    script: VecDeque<Outcome>,
    trace: Vec<Entry>,
    errno: c_int,
}

thread_local! {
    static DRIVER: RefCell<Option<Driver>> = const { RefCell::new(None) };
}

/// Install a scripted driver on the current thread. Outcomes are consumed in
/// order; a call past the end of the script succeeds with 0.
///
/// Panics if a driver is already installed (no nesting).
pub(crate) fn install(script: Vec<Outcome>) -> Guard {
    DRIVER.with(|slot| {
        let mut slot = slot.borrow_mut();
        assert!(slot.is_none(), "mock driver already installed on this thread");
        *slot = Some(Driver {
            script: script.into(),
            trace: Vec::new(),
            errno: 0,
        });
    });
    Guard(())
}

/// Uninstalls the thread's driver on drop.
pub(crate) struct Guard(());

impl Guard {
    /// Snapshot of the calls intercepted so far.
    pub(crate) fn trace(&self) -> Vec<Entry> {
        DRIVER.with(|slot| {
            slot.borrow()
                .as_ref()
                .map(|d| d.trace.clone())
                .unwrap_or_default()
        })
    }

    /// How many intercepted calls carried `name`.
    pub(crate) fn calls(&self, name: &str) -> usize {
        self.trace().iter().filter(|e| e.name == name).count()
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        DRIVER.with(|slot| slot.borrow_mut().take());
    }
}

/// Errno the accessor reports while a driver is installed.
pub(crate) fn errno_override() -> Option<c_int> {
    DRIVER.with(|slot| slot.borrow().as_ref().map(|d| d.errno))
}

/// Route a `set_errno` to the driver. Returns false when none is installed.
pub(crate) fn set_errno_override(value: c_int) -> bool {
    DRIVER.with(|slot| match slot.borrow_mut().as_mut() {
        Some(d) => {
            d.errno = value;
            true
        }
        None => false,
    })
}

/// Offer a shim call to the driver.
///
/// Returns `None` when no driver is installed (the shim then performs the
/// real call). Otherwise records the trace entry, pops the next outcome,
/// plants its errno, copies its payload into `output` (clamped to capacity),
/// and returns the scripted return value plus the byte count written.
pub(crate) fn intercept(
    name: &'static str,
    args: &[i64],
    input: Option<&[u8]>,
    output: Option<(*mut u8, usize)>,
) -> Option<(i64, usize)> {
    DRIVER.with(|slot| {
        let mut slot = slot.borrow_mut();
        let driver = slot.as_mut()?;
        driver.trace.push(Entry {
            name,
            args: args.to_vec(),
            bytes: input.map(<[u8]>::to_vec),
        });
        let outcome = driver.script.pop_front().unwrap_or(Outcome {
            ret: 0,
            errno: 0,
            payload: None,
        });
        driver.errno = outcome.errno;
        let mut wrote = 0;
        if let (Some((ptr, capacity)), Some(bytes)) = (output, outcome.payload.as_ref()) {
            wrote = bytes.len().min(capacity);
            // The shim owns the out pointer; the clamp keeps the copy inside
            // the caller's buffer.
            unsafe { core::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, wrote) };
        }
        Some((outcome.ret, wrote))
    })
}
