use proc_macro2::TokenStream;
use quote::quote;

use crate::validation::{FsmStructure, Hook};

pub fn render_machine_impl(fsm: &FsmStructure) -> TokenStream {
    let fsm_name = &fsm.fsm_name;
    let state_enum_name = fsm.state_enum_ident();
    let event_enum_name = fsm.event_enum_ident();
    let call_entry_hooks = fsm.call_entry_hooks;
    let call_exit_hooks = fsm.call_exit_hooks;

    let config = render_config(fsm);
    let event_arms = build_event_arms(fsm);
    let default_call = build_default_call(fsm);
    let on_entry = render_hook_fn(fsm, quote!(on_entry), &fsm.entry_hooks);
    let on_exit = render_hook_fn(fsm, quote!(on_exit), &fsm.exit_hooks);

    quote! {
        impl ::worker_fsm::Machine for #fsm_name {
            type State = #state_enum_name;
            type Event = #event_enum_name;

            const ENTRY_HOOKS: bool = #call_entry_hooks;
            const EXIT_HOOKS: bool = #call_exit_hooks;

            fn config() -> ::worker_fsm::WorkerConfig {
                #config
            }

            #[allow(unreachable_patterns)]
            fn on_event(
                &mut self,
                state: &#state_enum_name,
                event: #event_enum_name,
            ) -> ::worker_fsm::Transition<#state_enum_name> {
                match (state, event) {
                    #(#event_arms)*
                    (state, event) => #default_call,
                }
            }

            #on_entry
            #on_exit
        }
    }
}

pub fn render_inherent_impl(fsm: &FsmStructure) -> TokenStream {
    let fsm_name = &fsm.fsm_name;
    let handle_name = fsm.handle_ident();
    let context_type = &fsm.context_type;
    let methods = &fsm.methods;

    quote! {
        impl #fsm_name {
            /// Creates the machine around its context without starting it.
            pub fn new(context: #context_type) -> Self {
                Self { context }
            }

            /// Starts the machine on its own worker context, in its entry state.
            pub fn spawn(
                context: #context_type,
            ) -> ::core::result::Result<
                (#handle_name, ::worker_fsm::WorkerTask),
                ::worker_fsm::SpawnError,
            > {
                ::worker_fsm::spawn(Self::new(context))
            }

            pub fn context(&self) -> &#context_type {
                &self.context
            }

            pub fn context_mut(&mut self) -> &mut #context_type {
                &mut self.context
            }

            // Original user methods
            #(#methods)*
        }
    }
}

fn render_config(fsm: &FsmStructure) -> TokenStream {
    let worker = &fsm.worker;
    let name = &worker.name;

    let stack_size = worker
        .stack_size
        .map(|bytes| quote!(.stack_size(#bytes)));
    let priority = worker.priority.map(|priority| quote!(.priority(#priority)));
    let mailbox = worker.queue_capacity.map(|capacity| {
        quote!(.mailbox(::worker_fsm::MailboxPolicy::Queue { capacity: #capacity }))
    });
    let submit_timeout = worker.submit_timeout.map(|duration| {
        let secs = duration.as_secs();
        let nanos = duration.subsec_nanos();
        quote!(.submit_timeout(::core::time::Duration::new(#secs, #nanos)))
    });

    quote! {
        ::worker_fsm::WorkerConfig::new(#name)
            #stack_size
            #priority
            #mailbox
            #submit_timeout
    }
}

/// One match arm per explicit entry of the handler table.
fn build_event_arms(fsm: &FsmStructure) -> Vec<TokenStream> {
    let state_enum = fsm.state_enum_ident();
    let event_enum = fsm.event_enum_ident();

    fsm.handlers
        .iter()
        .map(|handler| {
            let state_name = &handler.state;
            let event_name = &handler.event;
            let method_name = &handler.method;
            let event_arg = if handler.event_by_ref {
                quote!(&event)
            } else {
                quote!(event)
            };

            quote! {
                (#state_enum::#state_name(state), #event_enum::#event_name(event)) => {
                    ::worker_fsm::Transition::widen(Self::#method_name(self, state, #event_arg))
                }
            }
        })
        .collect()
}

/// The catch-all arm: the author's `#[on_default]` method, or the
/// library's no-op fallback.
fn build_default_call(fsm: &FsmStructure) -> TokenStream {
    match &fsm.default_handler {
        Some(default) => {
            let method_name = &default.method;
            let event_arg = if default.event_by_ref {
                quote!(&event)
            } else {
                quote!(event)
            };
            quote! {
                ::worker_fsm::Transition::widen(Self::#method_name(self, state, #event_arg))
            }
        }
        None => quote! {
            ::worker_fsm::unhandled(state, &event)
        },
    }
}

fn render_hook_fn(fsm: &FsmStructure, fn_name: TokenStream, hooks: &[Hook]) -> TokenStream {
    if hooks.is_empty() {
        return quote! {};
    }
    let state_enum = fsm.state_enum_ident();
    let arms = hooks.iter().map(|hook| {
        let state_name = &hook.state;
        let method_name = &hook.method;
        quote! {
            #state_enum::#state_name(state) => Self::#method_name(self, state),
        }
    });

    quote! {
        #[allow(unreachable_patterns)]
        fn #fn_name(&mut self, state: &mut #state_enum) {
            match state {
                #(#arms)*
                _ => {}
            }
        }
    }
}
