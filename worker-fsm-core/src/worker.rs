//! The worker loop and the handle producers use to reach it.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::Instrument;

use crate::{
    Alternative, Engine, Machine, Mailbox, SpawnError, StateSet, SubmitError, ThreadService,
    WorkerConfig, WorkerService, WorkerTask,
};

/// What the worker publishes after each dispatch cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<S> {
    pub state: S,
    /// Completed dispatch cycles.
    pub cycle: u64,
}

/// Spawns `machine` on a dedicated thread using [`Machine::config`].
pub fn spawn<M: Machine>(machine: M) -> Result<(FsmHandle<M>, WorkerTask), SpawnError> {
    spawn_with(machine, M::config(), &ThreadService)
}

/// Spawns `machine` with an explicit configuration and worker service.
///
/// On success the machine sits in its entry state and no handler has run.
pub fn spawn_with<M, W>(
    machine: M,
    config: WorkerConfig,
    service: &W,
) -> Result<(FsmHandle<M>, WorkerTask), SpawnError>
where
    M: Machine,
    W: WorkerService + ?Sized,
{
    config.validate()?;

    let engine = Engine::new(machine);
    let mailbox = Arc::new(Mailbox::new(config.mailbox, config.submit_timeout));
    let (state_tx, state_rx) = watch::channel(Snapshot {
        state: engine.state().clone(),
        cycle: 0,
    });

    let span = tracing::info_span!("fsm_worker", worker = %config.name);
    let worker = run(engine, mailbox.clone(), state_tx).instrument(span);
    let task = service.spawn_worker(&config, Box::pin(worker))?;

    Ok((FsmHandle { mailbox, state_rx }, task))
}

/// Closes the mailbox when the worker loop goes away, including by panic.
struct CloseOnDrop<E>(Arc<Mailbox<E>>);

impl<E> Drop for CloseOnDrop<E> {
    fn drop(&mut self) {
        self.0.close();
    }
}

async fn run<M: Machine>(
    mut engine: Engine<M>,
    mailbox: Arc<Mailbox<M::Event>>,
    state_tx: watch::Sender<Snapshot<M::State>>,
) {
    let _close = CloseOnDrop(mailbox.clone());
    tracing::info!(
        state = engine.state().name(),
        policy = ?mailbox.policy(),
        "fsm worker started"
    );

    loop {
        let event = mailbox.recv().await;
        let changed = engine.step(event);
        let cycle = engine.cycles();
        state_tx.send_modify(|snapshot| {
            snapshot.cycle = cycle;
            if changed {
                snapshot.state = engine.state().clone();
            }
        });
    }
}

/// Producer-side access to a running machine.
///
/// Cheap to clone; every clone talks to the same worker.
pub struct FsmHandle<M: Machine> {
    mailbox: Arc<Mailbox<M::Event>>,
    state_rx: watch::Receiver<Snapshot<M::State>>,
}

impl<M: Machine> Clone for FsmHandle<M> {
    fn clone(&self) -> Self {
        Self {
            mailbox: self.mailbox.clone(),
            state_rx: self.state_rx.clone(),
        }
    }
}

impl<M: Machine> std::fmt::Debug for FsmHandle<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsmHandle")
            .field("snapshot", &*self.state_rx.borrow())
            .field("pending", &self.mailbox.pending())
            .finish()
    }
}

impl<M: Machine> FsmHandle<M> {
    /// Submits an event from a regular (non-interrupt) context. Never waits.
    ///
    /// Under the overwrite policy this replaces any event the worker has not
    /// picked up yet. A full queue returns [`SubmitError::Full`] at once.
    pub fn submit(&self, event: impl Into<M::Event>) -> Result<(), SubmitError<M::Event>> {
        self.mailbox.submit(event.into())
    }

    /// Submits an event, letting the calling task wait up to the configured
    /// submit timeout while the queue is full.
    pub async fn submit_async(
        &self,
        event: impl Into<M::Event>,
    ) -> Result<(), SubmitError<M::Event>> {
        self.mailbox.submit_async(event.into()).await
    }

    /// Submits an event, blocking the calling thread up to the configured
    /// submit timeout while the queue is full.
    ///
    /// Do not call this from async code; use [`submit_async`](Self::submit_async).
    pub fn blocking_submit(
        &self,
        event: impl Into<M::Event>,
    ) -> Result<(), SubmitError<M::Event>> {
        self.mailbox.blocking_submit(event.into())
    }

    /// Submits an event from an interrupt-like context without blocking.
    ///
    /// `Ok(true)` means the worker was woken and the caller should yield.
    pub fn submit_from_isr(
        &self,
        event: impl Into<M::Event>,
    ) -> Result<bool, SubmitError<M::Event>> {
        self.mailbox.submit_from_isr(event.into())
    }

    /// Snapshot of the live state. May be stale as soon as it returns.
    pub fn current_state(&self) -> M::State {
        self.state_rx.borrow().state.clone()
    }

    pub fn state_kind(&self) -> <M::State as StateSet>::Kind {
        self.state_rx.borrow().state.kind()
    }

    /// Reads the live state without cloning it.
    ///
    /// The worker cannot publish a new state while `f` runs, so keep it short.
    pub fn with_state<R>(&self, f: impl FnOnce(&M::State) -> R) -> R {
        f(&self.state_rx.borrow().state)
    }

    /// The live state as alternative `T`, if that is what it holds.
    pub fn try_state<T>(&self) -> Option<T>
    where
        T: Alternative<M::State> + Clone,
    {
        self.with_state(|state| T::peek(state).cloned())
    }

    /// The live state as alternative `T`.
    ///
    /// # Panics
    ///
    /// Panics if the machine is in any other alternative.
    pub fn expect_state<T>(&self) -> T
    where
        T: Alternative<M::State> + Clone,
    {
        self.with_state(|state| match T::peek(state) {
            Some(alternative) => alternative.clone(),
            None => panic!(
                "expected state `{}`, but the machine is in `{}`",
                T::NAME,
                state.name()
            ),
        })
    }

    /// Completed dispatch cycles.
    pub fn cycles(&self) -> u64 {
        self.state_rx.borrow().cycle
    }

    /// Events overwritten before the worker could dispatch them.
    pub fn dropped_events(&self) -> u64 {
        self.mailbox.dropped()
    }

    pub fn pending(&self) -> usize {
        self.mailbox.pending()
    }

    /// `true` while the worker is parked waiting for an event.
    pub fn is_worker_waiting(&self) -> bool {
        self.mailbox.is_worker_waiting()
    }

    /// `false` once the worker has stopped.
    pub fn is_running(&self) -> bool {
        !self.mailbox.is_closed()
    }

    /// Waits for the machine to reach the given alternative.
    pub async fn wait_for_state(
        &self,
        target: <M::State as StateSet>::Kind,
    ) -> Result<(), watch::error::RecvError> {
        let mut rx = self.state_rx.clone();
        loop {
            let reached = rx.borrow_and_update().state.kind() == target;
            if reached {
                return Ok(());
            }
            rx.changed().await?;
        }
    }

    /// Waits until at least `cycle` dispatch cycles have completed and
    /// returns the snapshot that satisfied it.
    pub async fn wait_for_cycle(
        &self,
        cycle: u64,
    ) -> Result<Snapshot<M::State>, watch::error::RecvError> {
        let mut rx = self.state_rx.clone();
        loop {
            {
                let snapshot = rx.borrow_and_update();
                if snapshot.cycle >= cycle {
                    return Ok(snapshot.clone());
                }
            }
            rx.changed().await?;
        }
    }
}
