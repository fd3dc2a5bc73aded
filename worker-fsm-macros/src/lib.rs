//! Proc macro for generating worker-driven finite state machines.

use darling::FromMeta;
use darling::ast::NestedMeta;
use proc_macro::TokenStream;
use syn::{ItemImpl, parse_macro_input};

mod attrs;
mod codegen;
mod helpers;
mod validation;

/// Main proc macro entry point.
///
/// Turns an impl block of per-(state, event) handlers into a complete
/// machine: the state and event sum types, the double-dispatch `Machine`
/// impl, and a `spawn` constructor.
///
/// ```ignore
/// #[fsm(states(Idle, Pressed), events(Press, Release, Timer), priority = 3)]
/// impl ButtonFsm {
///     #[on(state = Idle, event = Press)]
///     fn press(&mut self, _: &Idle, _: Press) -> Transition<Pressed> {
///         Transition::to(Pressed)
///     }
///
///     #[on_entry(Pressed)]
///     fn enter_pressed(&mut self, _: &mut Pressed) {}
/// }
/// ```
///
/// Pairs without an `#[on]` handler go to the `#[on_default]` method if there
/// is one, and otherwise leave the state unchanged.
#[proc_macro_attribute]
pub fn fsm(args: TokenStream, input: TokenStream) -> TokenStream {
    let list = match NestedMeta::parse_meta_list(args.into()) {
        Ok(list) => list,
        Err(e) => return darling::Error::from(e).write_errors().into(),
    };
    let fsm_args = match attrs::FsmArgs::from_list(&list) {
        Ok(args) => args,
        Err(e) => return e.write_errors().into(),
    };
    let input_impl = parse_macro_input!(input as ItemImpl);

    match generate_fsm(fsm_args, input_impl) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn generate_fsm(args: attrs::FsmArgs, input: ItemImpl) -> syn::Result<proc_macro2::TokenStream> {
    // Parse the FSM structure
    let fsm_structure = validation::FsmStructure::parse(args, input)?;

    // Generate the code
    Ok(codegen::generate(&fsm_structure))
}
