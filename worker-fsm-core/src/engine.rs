//! Dispatch and transition commit for a single machine.

use crate::{Machine, StateSet, Transition};

/// A machine together with its live state.
///
/// The worker loop owns one of these and feeds it one event per dispatch
/// cycle. It can also be driven directly, without a worker, which is how the
/// dispatch rules are tested.
#[derive(Debug)]
pub struct Engine<M: Machine> {
    machine: M,
    state: M::State,
    cycles: u64,
}

impl<M: Machine> Engine<M> {
    /// Creates an engine sitting in the entry state. No handler or hook has
    /// run yet.
    pub fn new(machine: M) -> Self {
        Self {
            machine,
            state: M::State::entry(),
            cycles: 0,
        }
    }

    pub fn state(&self) -> &M::State {
        &self.state
    }

    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    /// Number of completed dispatch cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn into_parts(self) -> (M, M::State) {
        (self.machine, self.state)
    }

    /// Runs the one handler matching the live state and `event`.
    pub fn dispatch(&mut self, event: M::Event) -> Transition<M::State> {
        tracing::trace!(
            state = self.state.name(),
            event = crate::EventSet::name(&event),
            "dispatch"
        );
        self.machine.on_event(&self.state, event)
    }

    /// Applies a handler's result.
    ///
    /// For a new state: exit hook on the old one, swap, entry hook on the new
    /// one. Returns whether the state was replaced.
    pub fn commit(&mut self, transition: Transition<M::State>) -> bool {
        let Transition::To(next) = transition else {
            return false;
        };

        if M::EXIT_HOOKS {
            self.machine.on_exit(&mut self.state);
        }
        let previous = std::mem::replace(&mut self.state, next);
        tracing::trace!(from = previous.name(), to = self.state.name(), "transition");
        drop(previous);
        if M::ENTRY_HOOKS {
            self.machine.on_entry(&mut self.state);
        }
        true
    }

    /// One full dispatch cycle.
    pub fn step(&mut self, event: M::Event) -> bool {
        let transition = self.dispatch(event);
        let changed = self.commit(transition);
        self.cycles += 1;
        changed
    }
}
