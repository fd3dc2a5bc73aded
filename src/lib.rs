//! # worker-fsm
//!
//! Finite state machines that run on their own dedicated worker context.
//! A machine is written as plain per-(state, event) handler methods; the
//! engine owns the one-slot mailbox, the worker loop and the transition
//! protocol, including optional entry and exit hooks.
//!
//! ## Example
//!
//! ```rust
//! use worker_fsm::{Transition, fsm};
//!
//! #[derive(Debug, Clone, Default)]
//! pub struct Idle;
//! #[derive(Debug, Clone, Default)]
//! pub struct Pressed;
//!
//! #[derive(Debug)]
//! pub struct Press;
//! #[derive(Debug)]
//! pub struct Release;
//!
//! #[fsm(states(Idle, Pressed), events(Press, Release))]
//! impl ButtonFsm {
//!     #[on(state = Idle, event = Press)]
//!     fn press(&mut self, _: &Idle, _: Press) -> Transition<Pressed> {
//!         Transition::to(Pressed)
//!     }
//!
//!     #[on(state = Pressed, event = Release)]
//!     fn release(&mut self, _: &Pressed, _: Release) -> Transition<Idle> {
//!         Transition::to(Idle)
//!     }
//! }
//!
//! let (handle, _worker) = ButtonFsm::spawn(()).unwrap();
//! assert_eq!(handle.state_kind(), ButtonFsmStateKind::Idle);
//! handle.submit(Press).unwrap();
//! ```

#[doc(inline)]
pub use worker_fsm_core::*;
#[doc(inline)]
pub use worker_fsm_macros::fsm;
