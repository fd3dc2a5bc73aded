//! Code generation for FSM implementation.

mod enums;
mod impls;
mod structs;

use proc_macro2::TokenStream;
use quote::quote;

use crate::validation::FsmStructure;

/// Generate the complete FSM implementation.
pub fn generate(fsm: &FsmStructure) -> TokenStream {
    let fsm_struct = structs::render_fsm_struct(fsm);
    let handle_alias = structs::render_handle_alias(fsm);
    let state_enum = enums::render_state_enum(fsm);
    let event_enum = enums::render_event_enum(fsm);
    let machine_impl = impls::render_machine_impl(fsm);
    let inherent_impl = impls::render_inherent_impl(fsm);

    quote! {
        #fsm_struct
        #handle_alias
        #state_enum
        #event_enum
        #machine_impl
        #inherent_impl
    }
}
