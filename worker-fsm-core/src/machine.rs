//! Traits describing a machine's closed state and event sets and its handler
//! object.
//!
//! These are normally implemented by `#[fsm]`, but nothing stops a machine
//! from implementing them by hand.

use std::fmt;

use crate::{Transition, WorkerConfig};

/// A closed set of state alternatives, exactly one of which is live.
pub trait StateSet: Clone + fmt::Debug + Send + Sync + 'static {
    /// Data-less tag naming each alternative.
    type Kind: Copy + Eq + fmt::Debug + Send + Sync + 'static;

    /// The entry state: the first declared alternative.
    fn entry() -> Self;

    /// Tag of the live alternative.
    fn kind(&self) -> Self::Kind;

    /// Name of the live alternative, used in logs and panic messages.
    fn name(&self) -> &'static str;
}

/// A closed set of event alternatives.
pub trait EventSet: fmt::Debug + Send + 'static {
    /// Name of the carried alternative.
    fn name(&self) -> &'static str;
}

/// One concrete member of the state set `S`.
pub trait Alternative<S>: Sized {
    /// Name of this alternative as declared.
    const NAME: &'static str;

    /// Borrows the alternative out of `set` if it is the live one.
    fn peek(set: &S) -> Option<&Self>;
}

/// The handler object driven by the engine.
///
/// `on_event` selects and runs the handler for the concrete (state, event)
/// pair. `on_entry` and `on_exit` run around a committed transition, but only
/// when the matching `*_HOOKS` constant is `true`; otherwise the committer
/// never calls them.
pub trait Machine: Send + 'static {
    type State: StateSet;
    type Event: EventSet;

    /// Run `on_entry` on the incoming state after each transition.
    const ENTRY_HOOKS: bool = false;
    /// Run `on_exit` on the outgoing state before each transition.
    const EXIT_HOOKS: bool = false;

    /// Worker configuration used by [`spawn`](crate::spawn).
    fn config() -> WorkerConfig
    where
        Self: Sized,
    {
        WorkerConfig::default()
    }

    /// Runs exactly one handler for `state` and `event`.
    fn on_event(&mut self, state: &Self::State, event: Self::Event) -> Transition<Self::State>;

    fn on_entry(&mut self, _state: &mut Self::State) {}

    fn on_exit(&mut self, _state: &mut Self::State) {}
}

/// Default handler for (state, event) pairs with no explicit handler.
///
/// Leaves the state unchanged.
pub fn unhandled<S: StateSet, E: EventSet>(state: &S, event: &E) -> Transition<S> {
    tracing::debug!(
        state = state.name(),
        event = event.name(),
        "no handler for event, state unchanged"
    );
    Transition::Stay
}
