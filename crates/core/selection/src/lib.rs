pub use custom::{resolve_custom_token, CustomToken};
pub use form::{is_valid_amount, token_choices, SelectionState, TokenChoice};

mod custom;
mod form;
