//! Cooperative suspension for the blocking-retry loop.
//!
//! # Design
//!
//! [`sleep`] returns a future that registers its deadline and waker with a
//! process-wide timer thread and yields. The timer thread starts lazily on
//! first use, keeps a deadline-ordered heap, and wakes tasks as their
//! deadlines pass; no caller thread blocks while suspended, so concurrent
//! work keeps running on the suspended task's thread. [`CancelToken`] is the
//! cooperative cancellation flag the retry loop observes between attempts.
//!
//! A future re-polled before its deadline registers again; the stale entry
//! just produces one spurious wake, which the deadline re-check absorbs.

use std::collections::BinaryHeap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::task::{Context, Poll, Waker};
use std::time::{Duration, Instant};

/// Cooperative cancellation flag, cloned into whatever should be able to stop
/// a retry loop. Cancelling is sticky.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Observed by the loop before its next retry.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Suspend the current task for `duration`.
pub fn sleep(duration: Duration) -> Sleep {
    Sleep {
        deadline: Instant::now() + duration,
    }
}

/// Future returned by [`sleep`].
#[derive(Debug)]
pub struct Sleep {
    deadline: Instant,
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if Instant::now() >= self.deadline {
            return Poll::Ready(());
        }
        // Registering after the deadline check closes the lost-wakeup window:
        // a deadline that passes in between is popped as already due.
        timer().register(Alarm {
            deadline: self.deadline,
            waker: cx.waker().clone(),
        });
        Poll::Pending
    }
}

struct Alarm {
    deadline: Instant,
    waker: Waker,
}

// Heap order: earliest deadline on top.
impl PartialEq for Alarm {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline
    }
}

impl Eq for Alarm {}

impl PartialOrd for Alarm {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Alarm {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        other.deadline.cmp(&self.deadline)
    }
}

struct TimerQueue {
    alarms: Mutex<BinaryHeap<Alarm>>,
    tick: Condvar,
}

fn timer() -> &'static Arc<TimerQueue> {
    static TIMER: OnceLock<Arc<TimerQueue>> = OnceLock::new();
    TIMER.get_or_init(|| {
        let queue = Arc::new(TimerQueue {
            alarms: Mutex::new(BinaryHeap::new()),
            tick: Condvar::new(),
        });
        let worker = Arc::clone(&queue);
        std::thread::Builder::new()
            .name("sysgate-timer".into())
            .spawn(move || worker.run())
            .expect("timer thread spawn");
        queue
    })
}

impl TimerQueue {
    fn register(&self, alarm: Alarm) {
        self.lock_alarms().push(alarm);
        self.tick.notify_one();
    }

    fn lock_alarms(&self) -> MutexGuard<'_, BinaryHeap<Alarm>> {
        self.alarms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run(&self) {
        let mut alarms = self.lock_alarms();
        loop {
            let now = Instant::now();
            let mut due = Vec::new();
            while alarms.peek().is_some_and(|head| head.deadline <= now) {
                if let Some(alarm) = alarms.pop() {
                    due.push(alarm.waker);
                }
            }
            if !due.is_empty() {
                // Wakers run arbitrary executor code; never under the lock.
                drop(alarms);
                for waker in due {
                    waker.wake();
                }
                alarms = self.lock_alarms();
                continue;
            }
            let next = alarms
                .peek()
                .map(|head| head.deadline.saturating_duration_since(now));
            alarms = match next {
                Some(timeout) => {
                    self.tick
                        .wait_timeout(alarms, timeout)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .tick
                    .wait(alarms)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }
}

/// Drive a future to completion on the current thread. Test helper; the
/// crate's async surface is executor-agnostic.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    struct ThreadWaker(std::thread::Thread);

    impl std::task::Wake for ThreadWaker {
        fn wake(self: Arc<Self>) {
            self.0.unpark();
        }
    }

    let mut future = std::pin::pin!(future);
    let waker = Waker::from(Arc::new(ThreadWaker(std::thread::current())));
    let mut cx = Context::from_waker(&waker);
    loop {
        match future.as_mut().poll(&mut cx) {
            Poll::Ready(value) => return value,
            Poll::Pending => std::thread::park(),
        }
    }
}
