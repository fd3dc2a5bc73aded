use quote::format_ident;
use syn::Ident;

/// Generates the identifier for the FSM's state enum: `[FsmName]State`
pub fn state_enum_ident(fsm_name: &Ident) -> Ident {
    format_ident!("{}State", fsm_name)
}

/// Generates the identifier for the FSM's state tag enum: `[FsmName]StateKind`
pub fn state_kind_ident(fsm_name: &Ident) -> Ident {
    format_ident!("{}StateKind", fsm_name)
}

/// Generates the identifier for the FSM's event enum: `[FsmName]Event`
pub fn event_enum_ident(fsm_name: &Ident) -> Ident {
    format_ident!("{}Event", fsm_name)
}

/// Generates the identifier for the FSM's handle alias: `[FsmName]Handle`
pub fn handle_ident(fsm_name: &Ident) -> Ident {
    format_ident!("{}Handle", fsm_name)
}

/// `ButtonFsm` -> `button_fsm`, used as the default worker name.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() {
            if prev_lower {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
            prev_lower = false;
        } else {
            out.push(ch);
            prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }
    out
}
