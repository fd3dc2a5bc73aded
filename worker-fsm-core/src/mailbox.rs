//! Event handoff between producers and the worker.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

use crate::{MailboxPolicy, SubmitError, WakeSignal};

/// Pending events plus the wake signal that tells the worker to drain them.
///
/// Under [`MailboxPolicy::Overwrite`] there is a single slot and the last
/// submission wins; whatever it displaced is dropped and counted in
/// [`dropped`](Self::dropped). Under [`MailboxPolicy::Queue`] events are kept
/// in order and a full queue pushes back on the producer instead.
///
/// Producers waiting for room are woken through `space` (threads) and
/// `room` (tasks) whenever the worker takes an event or the mailbox closes.
#[derive(Debug)]
pub struct Mailbox<E> {
    policy: MailboxPolicy,
    submit_timeout: Option<Duration>,
    slots: Mutex<VecDeque<E>>,
    space: Condvar,
    room: Notify,
    signal: WakeSignal,
    dropped: AtomicU64,
    closed: AtomicBool,
}

impl<E> Mailbox<E> {
    pub fn new(policy: MailboxPolicy, submit_timeout: Option<Duration>) -> Self {
        Self {
            policy,
            submit_timeout,
            slots: Mutex::new(VecDeque::with_capacity(policy.capacity())),
            space: Condvar::new(),
            room: Notify::new(),
            signal: WakeSignal::new(),
            dropped: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn policy(&self) -> MailboxPolicy {
        self.policy
    }

    /// Places `event` in the mailbox and wakes the worker. Never waits.
    ///
    /// A full queue hands the event straight back as [`SubmitError::Full`].
    pub fn submit(&self, event: E) -> Result<(), SubmitError<E>> {
        if self.is_closed() {
            return Err(SubmitError::Closed(event));
        }
        let displaced = Self::place(self.policy, &mut self.slots.lock(), event)?;
        self.delivered(displaced);
        Ok(())
    }

    /// Like [`submit`](Self::submit), but a full queue makes the calling task
    /// wait up to the configured submit timeout for the worker to make room.
    ///
    /// The wait needs a tokio runtime with the time driver enabled.
    pub async fn submit_async(&self, event: E) -> Result<(), SubmitError<E>> {
        let (MailboxPolicy::Queue { .. }, Some(timeout)) = (self.policy, self.submit_timeout)
        else {
            return self.submit(event);
        };
        let deadline = tokio::time::Instant::now() + timeout;

        let mut event = event;
        loop {
            let room = self.room.notified();
            tokio::pin!(room);
            // Register before trying so room made in between is not missed.
            room.as_mut().enable();

            match self.submit(event) {
                Err(SubmitError::Full(back)) => event = back,
                done => return done,
            }
            if tokio::time::timeout_at(deadline, room).await.is_err() {
                return self.submit(event);
            }
        }
    }

    /// Like [`submit`](Self::submit), but a full queue blocks the calling
    /// thread up to the configured submit timeout.
    ///
    /// For plain threads only; from async code use
    /// [`submit_async`](Self::submit_async), or the worker may never get to
    /// run while this waits.
    pub fn blocking_submit(&self, event: E) -> Result<(), SubmitError<E>> {
        let (MailboxPolicy::Queue { capacity }, Some(timeout)) =
            (self.policy, self.submit_timeout)
        else {
            return self.submit(event);
        };
        if self.is_closed() {
            return Err(SubmitError::Closed(event));
        }

        let mut slots = self.slots.lock();
        let deadline = Instant::now() + timeout;
        while slots.len() >= capacity {
            if self.is_closed() {
                return Err(SubmitError::Closed(event));
            }
            if self.space.wait_until(&mut slots, deadline).timed_out() {
                break;
            }
        }
        if self.is_closed() {
            return Err(SubmitError::Closed(event));
        }
        let displaced = Self::place(self.policy, &mut slots, event)?;
        drop(slots);
        self.delivered(displaced);
        Ok(())
    }

    /// Interrupt-safe submission. Never blocks.
    ///
    /// Returns `Ok(true)` if the worker was parked and has been woken, which
    /// means the caller should yield before resuming its own work. A full
    /// queue is reported at once, and so is a mailbox another context is
    /// holding locked.
    pub fn submit_from_isr(&self, event: E) -> Result<bool, SubmitError<E>> {
        if self.is_closed() {
            return Err(SubmitError::Closed(event));
        }

        let Some(mut slots) = self.slots.try_lock() else {
            return Err(SubmitError::Contended(event));
        };
        let displaced = Self::place(self.policy, &mut slots, event)?;
        drop(slots);

        self.count_displaced(displaced);
        Ok(self.signal.raise())
    }

    /// Puts `event` into `slots` under `policy`, returning what it displaced.
    fn place(
        policy: MailboxPolicy,
        slots: &mut VecDeque<E>,
        event: E,
    ) -> Result<Option<E>, SubmitError<E>> {
        let displaced = match policy {
            MailboxPolicy::Overwrite => slots.pop_front(),
            MailboxPolicy::Queue { capacity } if slots.len() >= capacity => {
                return Err(SubmitError::Full(event));
            }
            MailboxPolicy::Queue { .. } => None,
        };
        slots.push_back(event);
        Ok(displaced)
    }

    fn delivered(&self, displaced: Option<E>) {
        self.count_displaced(displaced);
        self.signal.raise();
    }

    fn count_displaced(&self, displaced: Option<E>) {
        if displaced.is_some() {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::debug!(total, "pending event overwritten before it was dispatched");
        }
    }

    /// Removes the oldest pending event without waiting.
    pub fn take(&self) -> Option<E> {
        let event = self.slots.lock().pop_front();
        if event.is_some() && matches!(self.policy, MailboxPolicy::Queue { .. }) {
            self.space.notify_one();
            self.room.notify_waiters();
        }
        event
    }

    /// Waits for the next event. Only the worker calls this.
    pub async fn recv(&self) -> E {
        loop {
            if let Some(event) = self.take() {
                return event;
            }
            self.signal.wait().await;
        }
    }

    /// Number of events overwritten before the worker saw them.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn pending(&self) -> usize {
        self.slots.lock().len()
    }

    /// `true` while the worker is parked waiting for an event.
    pub fn is_worker_waiting(&self) -> bool {
        self.signal.is_parked()
    }

    /// Refuses all further submissions and releases waiting producers.
    pub fn close(&self) {
        {
            // Under the lock, so a producer between its closed check and its
            // condvar wait cannot miss the wakeup.
            let _slots = self.slots.lock();
            self.closed.store(true, Ordering::Release);
            self.space.notify_all();
        }
        self.room.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
