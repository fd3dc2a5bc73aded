//! Validation logic for FSM structure.

use std::collections::HashSet;
use std::time::Duration;

use syn::{Error, FnArg, Ident, ImplItem, ImplItemFn, Type};

use crate::attrs::{self, MailboxKind};
use crate::helpers;

/// An explicit entry of the handler table.
#[derive(Debug, Clone)]
pub struct Handler {
    pub method: Ident,
    pub state: Ident,
    pub event: Ident,
    pub event_by_ref: bool,
}

/// The `#[on_default]` handler.
#[derive(Debug, Clone)]
pub struct DefaultHandler {
    pub method: Ident,
    pub event_by_ref: bool,
}

/// An `#[on_entry]` or `#[on_exit]` hook.
#[derive(Debug, Clone)]
pub struct Hook {
    pub method: Ident,
    pub state: Ident,
}

/// Worker settings taken from the macro arguments.
#[derive(Debug)]
pub struct WorkerSettings {
    pub name: String,
    pub stack_size: Option<usize>,
    pub priority: Option<u8>,
    pub queue_capacity: Option<usize>,
    pub submit_timeout: Option<Duration>,
}

/// Represents the complete FSM structure after parsing.
#[derive(Debug)]
pub struct FsmStructure {
    pub fsm_name: Ident,
    pub context_type: Type,
    pub states: Vec<Ident>,
    pub events: Vec<Ident>,
    pub handlers: Vec<Handler>,
    pub default_handler: Option<DefaultHandler>,
    pub entry_hooks: Vec<Hook>,
    pub exit_hooks: Vec<Hook>,
    pub call_entry_hooks: bool,
    pub call_exit_hooks: bool,
    pub worker: WorkerSettings,
    /// Every method of the impl block, with macro attributes stripped.
    pub methods: Vec<ImplItemFn>,
}

impl FsmStructure {
    /// Parse the impl block and extract FSM structure.
    pub fn parse(args: attrs::FsmArgs, impl_block: syn::ItemImpl) -> syn::Result<Self> {
        if !impl_block.generics.params.is_empty() {
            return Err(Error::new_spanned(
                &impl_block.generics,
                "generic state machines are not supported",
            ));
        }
        if let Some((_, path, _)) = &impl_block.trait_ {
            return Err(Error::new_spanned(path, "expected an inherent impl block"));
        }

        // Extract FSM name from impl block
        let fsm_name = match &*impl_block.self_ty {
            Type::Path(path) => path
                .path
                .get_ident()
                .ok_or_else(|| Error::new_spanned(&impl_block.self_ty, "Expected FSM type name"))?
                .clone(),
            _ => return Err(Error::new_spanned(&impl_block.self_ty, "Expected type path for FSM")),
        };

        let states = alternatives(&args.states, "state")?;
        let events = alternatives(&args.events, "event")?;
        let worker = worker_settings(&args, &fsm_name)?;

        let mut context_type = None;
        let mut handlers: Vec<Handler> = Vec::new();
        let mut default_handler: Option<DefaultHandler> = None;
        let mut entry_hooks: Vec<Hook> = Vec::new();
        let mut exit_hooks: Vec<Hook> = Vec::new();
        let mut methods = Vec::new();
        let mut table = HashSet::new();

        for item in &impl_block.items {
            match item {
                ImplItem::Type(ty) if ty.ident == "Context" => {
                    context_type = Some(ty.ty.clone());
                }
                ImplItem::Fn(method) => {
                    match parse_role(method)? {
                        Role::Plain => {}
                        Role::Handler(on) => {
                            check_member(&on.state, &states, "state")?;
                            check_member(&on.event, &events, "event")?;
                            check_sync(method)?;
                            let event_by_ref = handler_event_by_ref(method)?;
                            if !table.insert((on.state.to_string(), on.event.to_string())) {
                                return Err(Error::new_spanned(
                                    &method.sig.ident,
                                    format!(
                                        "duplicate handler for state `{}` and event `{}`",
                                        on.state, on.event
                                    ),
                                ));
                            }
                            handlers.push(Handler {
                                method: method.sig.ident.clone(),
                                state: on.state,
                                event: on.event,
                                event_by_ref,
                            });
                        }
                        Role::Default => {
                            if default_handler.is_some() {
                                return Err(Error::new_spanned(
                                    &method.sig.ident,
                                    "only one `#[on_default]` handler is allowed",
                                ));
                            }
                            check_sync(method)?;
                            default_handler = Some(DefaultHandler {
                                method: method.sig.ident.clone(),
                                event_by_ref: handler_event_by_ref(method)?,
                            });
                        }
                        Role::Entry(state) => {
                            entry_hooks.push(parse_hook(method, state, &states, &entry_hooks)?);
                        }
                        Role::Exit(state) => {
                            exit_hooks.push(parse_hook(method, state, &states, &exit_hooks)?);
                        }
                    }

                    let mut method = method.clone();
                    method.attrs.retain(|attr| !attrs::is_handler_attr(attr));
                    methods.push(method);
                }
                other => {
                    return Err(Error::new_spanned(
                        other,
                        "only methods and `type Context = ...;` are allowed in an fsm impl block",
                    ));
                }
            }
        }

        let context_type = context_type.unwrap_or_else(|| syn::parse_quote!(()));
        let call_entry_hooks = args.entry_hooks.unwrap_or(!entry_hooks.is_empty());
        let call_exit_hooks = args.exit_hooks.unwrap_or(!exit_hooks.is_empty());

        Ok(Self {
            fsm_name,
            context_type,
            states,
            events,
            handlers,
            default_handler,
            entry_hooks,
            exit_hooks,
            call_entry_hooks,
            call_exit_hooks,
            worker,
            methods,
        })
    }

    pub fn state_enum_ident(&self) -> Ident {
        helpers::state_enum_ident(&self.fsm_name)
    }

    pub fn state_kind_ident(&self) -> Ident {
        helpers::state_kind_ident(&self.fsm_name)
    }

    pub fn event_enum_ident(&self) -> Ident {
        helpers::event_enum_ident(&self.fsm_name)
    }

    pub fn handle_ident(&self) -> Ident {
        helpers::handle_ident(&self.fsm_name)
    }
}

enum Role {
    Plain,
    Handler(attrs::OnAttr),
    Default,
    Entry(Ident),
    Exit(Ident),
}

/// Works out what a method is from its macro attributes.
fn parse_role(method: &ImplItemFn) -> syn::Result<Role> {
    let mut role = Role::Plain;
    for attr in &method.attrs {
        let next = if attr.path().is_ident("on") {
            Role::Handler(attrs::OnAttr::parse(attr)?)
        } else if attr.path().is_ident("on_default") {
            Role::Default
        } else if attr.path().is_ident("on_entry") {
            Role::Entry(attrs::parse_hook_state(attr)?)
        } else if attr.path().is_ident("on_exit") {
            Role::Exit(attrs::parse_hook_state(attr)?)
        } else {
            continue;
        };
        if !matches!(role, Role::Plain) {
            return Err(Error::new_spanned(
                attr,
                "a method can carry only one of `#[on]`, `#[on_default]`, `#[on_entry]`, `#[on_exit]`",
            ));
        }
        role = next;
    }
    Ok(role)
}

fn alternatives(list: &[syn::Path], kind: &str) -> syn::Result<Vec<Ident>> {
    if list.is_empty() {
        return Err(Error::new(
            proc_macro2::Span::call_site(),
            format!("at least one {kind} is required"),
        ));
    }
    let mut seen = HashSet::new();
    let mut idents = Vec::with_capacity(list.len());
    for path in list {
        let ident = path.get_ident().ok_or_else(|| {
            Error::new_spanned(path, format!("{kind} must be a plain type name"))
        })?;
        if !seen.insert(ident.to_string()) {
            return Err(Error::new_spanned(ident, format!("duplicate {kind} `{ident}`")));
        }
        idents.push(ident.clone());
    }
    Ok(idents)
}

fn worker_settings(args: &attrs::FsmArgs, fsm_name: &Ident) -> syn::Result<WorkerSettings> {
    let call_site = proc_macro2::Span::call_site();

    let queue_capacity = match (args.mailbox, args.capacity) {
        (Some(MailboxKind::Queue), Some(0)) => {
            return Err(Error::new(call_site, "queue capacity must be at least 1"));
        }
        (Some(MailboxKind::Queue), Some(capacity)) => Some(capacity),
        (Some(MailboxKind::Queue), None) => {
            return Err(Error::new(call_site, "`mailbox = \"queue\"` requires `capacity = N`"));
        }
        (_, Some(_)) => {
            return Err(Error::new(call_site, "`capacity` requires `mailbox = \"queue\"`"));
        }
        (_, None) => None,
    };

    let submit_timeout = match &args.submit_timeout {
        Some(lit) => Some(
            humantime::parse_duration(&lit.value())
                .map_err(|e| Error::new_spanned(lit, format!("invalid duration: {e}")))?,
        ),
        None => None,
    };

    Ok(WorkerSettings {
        name: args
            .name
            .as_ref()
            .map(|lit| lit.value())
            .unwrap_or_else(|| helpers::snake_case(&fsm_name.to_string())),
        stack_size: args.stack_size,
        priority: args.priority,
        queue_capacity,
        submit_timeout,
    })
}

fn check_member(ident: &Ident, declared: &[Ident], kind: &str) -> syn::Result<()> {
    if declared.iter().any(|d| d == ident) {
        return Ok(());
    }
    let names: Vec<String> = declared.iter().map(ToString::to_string).collect();
    Err(Error::new_spanned(
        ident,
        format!("unknown {kind} `{ident}`; declared: {}", names.join(", ")),
    ))
}

fn check_sync(method: &ImplItemFn) -> syn::Result<()> {
    if let Some(token) = &method.sig.asyncness {
        return Err(Error::new_spanned(token, "handlers must be synchronous"));
    }
    Ok(())
}

/// Checks `&mut self` plus `expected` further arguments.
fn check_arity(method: &ImplItemFn, expected: usize, shape: &str) -> syn::Result<()> {
    let receiver_ok = matches!(
        method.sig.inputs.first(),
        Some(FnArg::Receiver(r)) if r.reference.is_some() && r.mutability.is_some()
    );
    if !receiver_ok || method.sig.inputs.len() != expected + 1 {
        return Err(Error::new_spanned(
            &method.sig,
            format!("expected signature `{shape}`"),
        ));
    }
    Ok(())
}

/// Handlers are `fn(&mut self, state: &S, event: E | &E)`; reports whether
/// the event is taken by reference.
fn handler_event_by_ref(method: &ImplItemFn) -> syn::Result<bool> {
    check_arity(
        method,
        2,
        "fn(&mut self, state: &State, event: Event) -> Transition<_>",
    )?;
    match &method.sig.inputs[2] {
        FnArg::Typed(pat) => Ok(matches!(*pat.ty, Type::Reference(_))),
        FnArg::Receiver(r) => Err(Error::new_spanned(r, "unexpected receiver")),
    }
}

fn parse_hook(
    method: &ImplItemFn,
    state: Ident,
    states: &[Ident],
    existing: &[Hook],
) -> syn::Result<Hook> {
    check_member(&state, states, "state")?;
    check_sync(method)?;
    check_arity(method, 1, "fn(&mut self, state: &mut State)")?;
    if existing.iter().any(|hook| hook.state == state) {
        return Err(Error::new_spanned(
            &method.sig.ident,
            format!("duplicate hook for state `{state}`"),
        ));
    }
    Ok(Hook {
        method: method.sig.ident.clone(),
        state,
    })
}
