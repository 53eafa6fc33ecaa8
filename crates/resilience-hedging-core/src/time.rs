//! Clock abstraction so the hedging delay loop can be driven by a virtual
//! clock in tests instead of real wall-clock time.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// A monotonic clock plus a cancellable delay.
///
/// Production code uses [`TokioTimeSource`]; tests substitute
/// [`ManualTimeSource`], which only advances when told to, so hedging-delay
/// scenarios are deterministic instead of racing real sleeps.
pub trait TimeSource: Send + Sync {
    /// The current instant according to this clock.
    fn now(&self) -> Instant;

    /// Sleeps for `duration`, resolving early and silently if `cancel` is
    /// triggered first. Must not leak a background timer once the returned
    /// future is dropped.
    fn delay(&self, duration: Duration, cancel: CancellationToken) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// The default [`TimeSource`], backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeSource;

impl TimeSource for TokioTimeSource {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn delay(&self, duration: Duration, cancel: CancellationToken) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(duration) => {}
            }
        })
    }
}

/// A virtual clock that only moves forward when [`ManualTimeSource::advance`]
/// is called, used by the property and scenario tests in this crate to
/// exercise hedging-delay timing deterministically.
#[derive(Clone)]
pub struct ManualTimeSource {
    inner: Arc<Mutex<ManualClockState>>,
}

struct ManualClockState {
    now: Instant,
    waiters: Vec<ManualWaiter>,
}

struct ManualWaiter {
    deadline: Instant,
    notify: Arc<tokio::sync::Notify>,
}

impl ManualTimeSource {
    /// Creates a new virtual clock starting at [`Instant::now`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualClockState {
                now: Instant::now(),
                waiters: Vec::new(),
            })),
        }
    }

    /// Advances the virtual clock by `duration`, waking any delay whose
    /// deadline has now elapsed.
    pub fn advance(&self, duration: Duration) {
        let mut state = self.inner.lock().expect("manual clock mutex poisoned");
        state.now += duration;
        let now = state.now;
        state.waiters.retain(|waiter| {
            if waiter.deadline <= now {
                waiter.notify.notify_waiters();
                false
            } else {
                true
            }
        });
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        self.inner.lock().expect("manual clock mutex poisoned").now
    }

    fn delay(&self, duration: Duration, cancel: CancellationToken) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        let inner = Arc::clone(&self.inner);

        Box::pin(async move {
            let notify = Arc::new(tokio::sync::Notify::new());
            let deadline = {
                let mut state = inner.lock().expect("manual clock mutex poisoned");
                let deadline = state.now + duration;
                if deadline <= state.now {
                    return;
                }
                state.waiters.push(ManualWaiter {
                    deadline,
                    notify: Arc::clone(&notify),
                });
                deadline
            };

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => return,
                    () = notify.notified() => {
                        let now = inner.lock().expect("manual clock mutex poisoned").now;
                        if now >= deadline {
                            return;
                        }
                    }
                }
            }
        })
    }
}
