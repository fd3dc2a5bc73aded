//! Binary wake signal between producers and the worker.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A saturating binary signal.
///
/// Raising it while nobody waits stores a single wake; further raises before
/// the next wait collapse into that one. Raising never blocks.
#[derive(Debug, Default)]
pub struct WakeSignal {
    notify: Notify,
    parked: AtomicBool,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal.
    ///
    /// Returns `true` if the waiter was parked and has now been woken. Callers
    /// on an interrupt-like path use it as a hint to yield.
    pub fn raise(&self) -> bool {
        let woke = self.parked.swap(false, Ordering::AcqRel);
        self.notify.notify_one();
        woke
    }

    /// Waits until the signal is raised, consuming the stored wake if there
    /// is one.
    ///
    /// Only a single task may wait at a time.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before publishing `parked` so a raise in between is kept.
        notified.as_mut().enable();
        self.parked.store(true, Ordering::Release);
        notified.await;
        self.parked.store(false, Ordering::Release);
    }

    /// Returns `true` while the waiter is parked in [`wait`](Self::wait).
    pub fn is_parked(&self) -> bool {
        self.parked.load(Ordering::Acquire)
    }
}
