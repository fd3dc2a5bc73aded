use proc_macro2::TokenStream;
use quote::quote;

use crate::validation::FsmStructure;

pub fn render_fsm_struct(fsm: &FsmStructure) -> TokenStream {
    let fsm_name = &fsm.fsm_name;
    let context_type = &fsm.context_type;

    quote! {
        /// The finite state machine structure.
        pub struct #fsm_name {
            context: #context_type,
        }
    }
}

pub fn render_handle_alias(fsm: &FsmStructure) -> TokenStream {
    let fsm_name = &fsm.fsm_name;
    let handle_name = fsm.handle_ident();

    quote! {
        /// A handle to the running FSM for event submission and state observation.
        pub type #handle_name = ::worker_fsm::FsmHandle<#fsm_name>;
    }
}
