/// The outcome of one event handler.
///
/// A handler either leaves the machine where it is ([`Transition::Stay`]) or
/// hands back a fully constructed replacement state ([`Transition::To`]).
/// There is no partial update: the committer swaps the whole value.
///
/// Handlers usually return a transition to one concrete state alternative and
/// let the generated dispatch code widen it into the machine's state set.
///
/// # Example
///
/// ```rust
/// # use worker_fsm_core::Transition;
/// #[derive(Debug, Default, Clone)]
/// struct Pressed;
///
/// fn on_press() -> Transition<Pressed> {
///     Transition::to(Pressed)
/// }
///
/// fn on_timer() -> Transition<Pressed> {
///     Transition::Stay
/// }
/// # assert!(on_press().is_change());
/// # assert!(!on_timer().is_change());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a transition does nothing unless it is returned to the engine"]
pub enum Transition<T> {
    /// Keep the current state.
    Stay,
    /// Replace the current state with this value.
    To(T),
}

impl<T> Transition<T> {
    /// Creates a transition to the specified target state.
    pub fn to(state: T) -> Self {
        Self::To(state)
    }

    /// Returns `true` if this transition replaces the current state.
    #[must_use]
    pub fn is_change(&self) -> bool {
        matches!(self, Self::To(_))
    }

    /// Converts the target into a wider state type, usually the machine's
    /// state set.
    pub fn widen<S: From<T>>(self) -> Transition<S> {
        match self {
            Self::Stay => Transition::Stay,
            Self::To(state) => Transition::To(state.into()),
        }
    }

    /// Extracts the target state, if any.
    #[must_use]
    pub fn into_state(self) -> Option<T> {
        match self {
            Self::Stay => None,
            Self::To(state) => Some(state),
        }
    }
}

impl<T> From<Option<T>> for Transition<T> {
    fn from(state: Option<T>) -> Self {
        state.map_or(Self::Stay, Self::To)
    }
}
