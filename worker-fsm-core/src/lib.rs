//! Core runtime types for worker-fsm.
//!
//! A machine is a [`Machine`] handler object over a closed [`StateSet`] and a
//! closed [`EventSet`]. [`spawn`] gives it a dedicated worker context that
//! waits on a [`Mailbox`], runs one dispatch cycle per event through an
//! [`Engine`], and publishes the resulting state to every [`FsmHandle`].

mod config;
mod engine;
mod error;
mod machine;
mod mailbox;
mod service;
mod signal;
mod transition;
mod worker;

pub use config::{DEFAULT_STACK_SIZE, MIN_STACK_SIZE, MailboxPolicy, WorkerConfig};
pub use engine::Engine;
pub use error::{SpawnError, SubmitError};
pub use machine::{Alternative, EventSet, Machine, StateSet, unhandled};
pub use mailbox::Mailbox;
pub use service::{RuntimeService, ThreadService, WorkerFuture, WorkerService, WorkerTask};
pub use signal::WakeSignal;
pub use transition::Transition;
pub use worker::{FsmHandle, Snapshot, spawn, spawn_with};
