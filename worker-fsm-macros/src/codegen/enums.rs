use proc_macro2::TokenStream;
use quote::quote;

use crate::validation::FsmStructure;

pub fn render_state_enum(fsm: &FsmStructure) -> TokenStream {
    let state_enum_name = fsm.state_enum_ident();
    let kind_enum_name = fsm.state_kind_ident();
    let states = &fsm.states;
    let names: Vec<String> = states.iter().map(ToString::to_string).collect();
    let entry = &states[0];

    let alternatives: Vec<_> = states
        .iter()
        .zip(&names)
        .map(|(name, label)| {
            quote! {
                impl From<#name> for #state_enum_name {
                    fn from(state: #name) -> Self {
                        #state_enum_name::#name(state)
                    }
                }

                impl ::worker_fsm::Alternative<#state_enum_name> for #name {
                    const NAME: &'static str = #label;

                    fn peek(set: &#state_enum_name) -> Option<&Self> {
                        #[allow(unreachable_patterns)]
                        match set {
                            #state_enum_name::#name(state) => Some(state),
                            _ => None,
                        }
                    }
                }
            }
        })
        .collect();

    quote! {
        /// All states of the machine; the first one is the entry state.
        #[derive(Debug, Clone)]
        pub enum #state_enum_name {
            #(#states(#states),)*
        }

        /// Tags naming each state of the machine.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum #kind_enum_name {
            #(#states,)*
        }

        impl ::worker_fsm::StateSet for #state_enum_name {
            type Kind = #kind_enum_name;

            fn entry() -> Self {
                #state_enum_name::#entry(::core::default::Default::default())
            }

            fn kind(&self) -> #kind_enum_name {
                match self {
                    #(#state_enum_name::#states(_) => #kind_enum_name::#states,)*
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    #(#state_enum_name::#states(_) => #names,)*
                }
            }
        }

        #(#alternatives)*
    }
}

pub fn render_event_enum(fsm: &FsmStructure) -> TokenStream {
    let event_enum_name = fsm.event_enum_ident();
    let events = &fsm.events;
    let names: Vec<String> = events.iter().map(ToString::to_string).collect();

    quote! {
        /// All events the machine accepts.
        #[derive(Debug)]
        pub enum #event_enum_name {
            #(#events(#events),)*
        }

        impl ::worker_fsm::EventSet for #event_enum_name {
            fn name(&self) -> &'static str {
                match self {
                    #(#event_enum_name::#events(_) => #names,)*
                }
            }
        }

        #(
            impl From<#events> for #event_enum_name {
                fn from(event: #events) -> Self {
                    #event_enum_name::#events(event)
                }
            }
        )*
    }
}
