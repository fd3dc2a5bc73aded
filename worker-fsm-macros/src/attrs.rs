//! Attribute parsing for FSM macro.

use darling::FromMeta;
use darling::util::PathList;
use syn::{Attribute, Ident, LitStr};

/// Arguments for the `#[fsm(...)]` attribute.
#[derive(Debug, FromMeta)]
pub struct FsmArgs {
    /// State alternatives; the first one is the entry state (required).
    pub states: PathList,
    /// Event alternatives (required).
    pub events: PathList,

    /// Worker name (default: the machine name in snake case).
    #[darling(default)]
    pub name: Option<LitStr>,
    #[darling(default)]
    pub stack_size: Option<usize>,
    #[darling(default)]
    pub priority: Option<u8>,

    /// Mailbox policy (default: overwrite).
    #[darling(default)]
    pub mailbox: Option<MailboxKind>,
    /// Queue capacity, only with `mailbox = "queue"`.
    #[darling(default)]
    pub capacity: Option<usize>,
    /// How long `submit` may wait on a full queue, e.g. `"10ms"`.
    #[darling(default)]
    pub submit_timeout: Option<LitStr>,

    /// Force entry hooks on or off (default: on if any `#[on_entry]` exists).
    #[darling(default)]
    pub entry_hooks: Option<bool>,
    /// Force exit hooks on or off (default: on if any `#[on_exit]` exists).
    #[darling(default)]
    pub exit_hooks: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromMeta)]
pub enum MailboxKind {
    #[darling(rename = "overwrite")]
    Overwrite,
    #[darling(rename = "queue")]
    Queue,
}

/// Arguments for the `#[on(state = Idle, event = Press)]` attribute.
#[derive(Debug)]
pub struct OnAttr {
    /// State this handler is valid in.
    pub state: Ident,
    /// Event that triggers this handler.
    pub event: Ident,
}

impl OnAttr {
    pub fn parse(attr: &Attribute) -> syn::Result<Self> {
        let mut state = None;
        let mut event = None;

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("state") {
                state = Some(meta.value()?.parse::<Ident>()?);
                Ok(())
            } else if meta.path.is_ident("event") {
                event = Some(meta.value()?.parse::<Ident>()?);
                Ok(())
            } else {
                Err(meta.error("expected `state = ...` or `event = ...`"))
            }
        })?;

        let state =
            state.ok_or_else(|| syn::Error::new_spanned(attr, "missing `state = ...`"))?;
        let event =
            event.ok_or_else(|| syn::Error::new_spanned(attr, "missing `event = ...`"))?;
        Ok(Self { state, event })
    }
}

/// Argument of `#[on_entry(State)]` and `#[on_exit(State)]`.
pub fn parse_hook_state(attr: &Attribute) -> syn::Result<Ident> {
    attr.parse_args::<Ident>()
}

/// Attributes consumed by the macro; stripped from the emitted methods.
pub const HANDLER_ATTRS: [&str; 4] = ["on", "on_default", "on_entry", "on_exit"];

pub fn is_handler_attr(attr: &Attribute) -> bool {
    HANDLER_ATTRS.iter().any(|name| attr.path().is_ident(name))
}
