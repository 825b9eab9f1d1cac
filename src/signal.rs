//! Signal numbers, signal sets, and handler installation.

use core::fmt;
use core::mem;

use libc::{c_int, sighandler_t, sigset_t};

use crate::call::{demux, nothing_or_errno, value_or_errno};
use crate::errno::Result;
use crate::platform;

/// A signal number.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signal(c_int);

impl Signal {
    pub const HUP: Self = Self(libc::SIGHUP);
    pub const INT: Self = Self(libc::SIGINT);
    pub const QUIT: Self = Self(libc::SIGQUIT);
    pub const ILL: Self = Self(libc::SIGILL);
    pub const TRAP: Self = Self(libc::SIGTRAP);
    pub const ABRT: Self = Self(libc::SIGABRT);
    pub const BUS: Self = Self(libc::SIGBUS);
    pub const FPE: Self = Self(libc::SIGFPE);
    pub const KILL: Self = Self(libc::SIGKILL);
    pub const USR1: Self = Self(libc::SIGUSR1);
    pub const SEGV: Self = Self(libc::SIGSEGV);
    pub const USR2: Self = Self(libc::SIGUSR2);
    pub const PIPE: Self = Self(libc::SIGPIPE);
    pub const ALRM: Self = Self(libc::SIGALRM);
    pub const TERM: Self = Self(libc::SIGTERM);
    pub const CHLD: Self = Self(libc::SIGCHLD);
    pub const CONT: Self = Self(libc::SIGCONT);
    pub const STOP: Self = Self(libc::SIGSTOP);
    pub const TSTP: Self = Self(libc::SIGTSTP);
    pub const TTIN: Self = Self(libc::SIGTTIN);
    pub const TTOU: Self = Self(libc::SIGTTOU);
    pub const URG: Self = Self(libc::SIGURG);
    pub const XCPU: Self = Self(libc::SIGXCPU);
    pub const XFSZ: Self = Self(libc::SIGXFSZ);
    pub const VTALRM: Self = Self(libc::SIGVTALRM);
    pub const PROF: Self = Self(libc::SIGPROF);
    pub const WINCH: Self = Self(libc::SIGWINCH);
    pub const SYS: Self = Self(libc::SIGSYS);

    #[inline]
    pub const fn from_raw(raw: c_int) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> c_int {
        self.0
    }

    const fn name(self) -> &'static str {
        match self.0 {
            libc::SIGHUP => "SIGHUP",
            libc::SIGINT => "SIGINT",
            libc::SIGQUIT => "SIGQUIT",
            libc::SIGILL => "SIGILL",
            libc::SIGTRAP => "SIGTRAP",
            libc::SIGABRT => "SIGABRT",
            libc::SIGBUS => "SIGBUS",
            libc::SIGFPE => "SIGFPE",
            libc::SIGKILL => "SIGKILL",
            libc::SIGUSR1 => "SIGUSR1",
            libc::SIGSEGV => "SIGSEGV",
            libc::SIGUSR2 => "SIGUSR2",
            libc::SIGPIPE => "SIGPIPE",
            libc::SIGALRM => "SIGALRM",
            libc::SIGTERM => "SIGTERM",
            libc::SIGCHLD => "SIGCHLD",
            libc::SIGCONT => "SIGCONT",
            libc::SIGSTOP => "SIGSTOP",
            libc::SIGTSTP => "SIGTSTP",
            libc::SIGTTIN => "SIGTTIN",
            libc::SIGTTOU => "SIGTTOU",
            libc::SIGURG => "SIGURG",
            libc::SIGXCPU => "SIGXCPU",
            libc::SIGXFSZ => "SIGXFSZ",
            libc::SIGVTALRM => "SIGVTALRM",
            libc::SIGPROF => "SIGPROF",
            libc::SIGWINCH => "SIGWINCH",
            libc::SIGSYS => "SIGSYS",
            _ => "unknown",
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            "unknown" => write!(f, "Signal({})", self.0),
            name => write!(f, "Signal({name})"),
        }
    }
}

/// A set of signals, used as a handler's delivery mask.
#[derive(Clone, Copy)]
pub struct SignalSet(sigset_t);

impl SignalSet {
    /// The empty set.
    pub fn empty() -> Self {
        let mut set: sigset_t = unsafe { mem::zeroed() };
        platform::sigemptyset(&mut set);
        Self(set)
    }

    /// Every catchable signal.
    pub fn full() -> Self {
        let mut set: sigset_t = unsafe { mem::zeroed() };
        platform::sigfillset(&mut set);
        Self(set)
    }

    /// # Errors
    /// * `EINVAL` - Not a valid signal number
    pub fn add(&mut self, signal: Signal) -> Result<()> {
        nothing_or_errno(false, || platform::sigaddset(&mut self.0, signal.raw()))
    }

    /// # Errors
    /// * `EINVAL` - Not a valid signal number
    pub fn remove(&mut self, signal: Signal) -> Result<()> {
        nothing_or_errno(false, || platform::sigdelset(&mut self.0, signal.raw()))
    }

    /// # Errors
    /// * `EINVAL` - Not a valid signal number
    pub fn contains(&self, signal: Signal) -> Result<bool> {
        demux(platform::sigismember(&self.0, signal.raw())).map(|member| member == 1)
    }

    pub(crate) const fn from_raw(raw: sigset_t) -> Self {
        Self(raw)
    }

    pub(crate) const fn raw(&self) -> sigset_t {
        self.0
    }
}

impl Default for SignalSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SignalSet(..)")
    }
}

/// What happens when a signal arrives.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SignalHandler {
    /// The platform's default disposition.
    Default,
    /// Discard the signal.
    Ignore,
    /// Run this function with the signal number.
    Handler(extern "C" fn(c_int)),
}

impl SignalHandler {
    fn to_raw(self) -> sighandler_t {
        match self {
            Self::Default => libc::SIG_DFL,
            Self::Ignore => libc::SIG_IGN,
            Self::Handler(f) => f as usize,
        }
    }

    fn from_raw(raw: sighandler_t) -> Self {
        match raw {
            libc::SIG_DFL => Self::Default,
            libc::SIG_IGN => Self::Ignore,
            _ => Self::Handler(unsafe { mem::transmute::<usize, extern "C" fn(c_int)>(raw) }),
        }
    }
}

bitflags::bitflags! {
    /// Behavior flags for an installed handler.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct SaFlags: c_int {
        /// No SIGCHLD when children stop.
        const NOCLDSTOP = libc::SA_NOCLDSTOP;
        /// Do not transform children into zombies.
        const NOCLDWAIT = libc::SA_NOCLDWAIT;
        /// Deliver the signal itself while its handler runs.
        const NODEFER = libc::SA_NODEFER;
        /// Run the handler on the alternate stack.
        const ONSTACK = libc::SA_ONSTACK;
        /// Reset to the default disposition on entry to the handler.
        const RESETHAND = libc::SA_RESETHAND;
        /// Restart interruptible calls instead of failing them with EINTR.
        const RESTART = libc::SA_RESTART;
    }
}

/// A complete signal disposition: handler, delivery mask, and flags.
#[derive(Clone, Copy, Debug)]
pub struct SignalAction {
    pub handler: SignalHandler,
    pub mask: SignalSet,
    pub flags: SaFlags,
}

impl SignalAction {
    /// A disposition with an empty mask and no flags.
    pub fn new(handler: SignalHandler) -> Self {
        Self {
            handler,
            mask: SignalSet::empty(),
            flags: SaFlags::empty(),
        }
    }

    fn to_raw(&self) -> libc::sigaction {
        let mut raw: libc::sigaction = unsafe { mem::zeroed() };
        raw.sa_sigaction = self.handler.to_raw();
        raw.sa_mask = self.mask.raw();
        raw.sa_flags = self.flags.bits();
        raw
    }

    fn from_raw(raw: &libc::sigaction) -> Self {
        Self {
            handler: SignalHandler::from_raw(raw.sa_sigaction),
            mask: SignalSet::from_raw(raw.sa_mask),
            flags: SaFlags::from_bits_retain(raw.sa_flags),
        }
    }
}

/// Install `action` for `signal` and return the disposition it replaced.
///
/// # Safety
///
/// A [`SignalHandler::Handler`] function runs in async-signal context and may
/// interrupt the thread at any instruction; it must restrict itself to
/// async-signal-safe work.
///
/// # Errors
/// * `EINVAL` - Invalid signal, or one whose disposition cannot change
///   (KILL, STOP)
pub unsafe fn set_action(signal: Signal, action: &SignalAction) -> Result<SignalAction> {
    let raw = action.to_raw();
    let mut old: libc::sigaction = unsafe { mem::zeroed() };
    nothing_or_errno(false, || unsafe {
        platform::sigaction(signal.raw(), &raw, &mut old)
    })?;
    Ok(SignalAction::from_raw(&old))
}

/// Install a bare handler through the historical interface and return the
/// one it replaced. Failure comes back as the SIG_ERR sentinel. Semantics
/// beyond replacement vary by platform; prefer [`set_action`].
///
/// # Safety
///
/// Same handler contract as [`set_action`].
pub unsafe fn set_handler(signal: Signal, handler: SignalHandler) -> Result<SignalHandler> {
    value_or_errno(false, || platform::signal(signal.raw(), handler.to_raw()))
        .map(SignalHandler::from_raw)
}

/// The currently installed disposition for `signal`.
pub fn current_action(signal: Signal) -> Result<SignalAction> {
    let mut old: libc::sigaction = unsafe { mem::zeroed() };
    nothing_or_errno(false, || unsafe {
        platform::sigaction(signal.raw(), core::ptr::null(), &mut old)
    })?;
    Ok(SignalAction::from_raw(&old))
}

/// Deliver `signal` to the calling thread. The handler, if any, runs before
/// this returns.
pub fn raise(signal: Signal) -> Result<()> {
    nothing_or_errno(false, || platform::raise(signal.raw()))
}
