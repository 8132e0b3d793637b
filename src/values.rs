//! Typed destinations for parsed tokens.
//!
//! Every declared option/argument owns exactly one holder. The holder
//! writes through an exclusive borrow of a caller-owned variable, so the
//! caller reads results straight out of their own bindings after a parse.

use thiserror::Error;

mod env;
mod holders;

pub(crate) use env::set_from_env_with;
pub use holders::{
    BoolValue, EnumValue, FloatValue, FloatsValue, IntValue, IntsValue, StringValue, StringsValue,
};

/// A token that a holder refused to accept.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidValue {
    /// The token does not parse as the holder's type.
    #[error("cannot convert '{token}' to {type_name}")]
    InvalidConversion {
        /// The rejected token.
        token: String,
        /// The holder's type, for the error message.
        type_name: &'static str,
    },

    /// The token is not among an enum holder's declared choices.
    #[error("invalid value '{token}', valid values are {choices}")]
    InvalidChoice {
        /// The rejected token.
        token: String,
        /// The comma separated list of accepted values.
        choices: String,
    },
}

/// Behaviour of a typed value slot.
///
/// `check` must accept exactly the tokens `set` accepts; it exists so
/// callers can validate a whole batch of tokens before mutating anything.
pub trait Value {
    /// Validate a token without touching the stored value.
    fn check(&self, token: &str) -> Result<(), InvalidValue>;

    /// Parse a token and store it. Sequence holders append.
    fn set(&mut self, token: &str) -> Result<(), InvalidValue>;

    /// Empty the accumulated list. No-op for scalar holders.
    fn clear(&mut self) {}

    /// True only for the scalar bool holder, which is the only holder
    /// allowed to bind to an option without consuming a value token.
    fn is_bool(&self) -> bool {
        false
    }

    /// True for sequence holders.
    fn is_multi(&self) -> bool {
        false
    }

    /// True while the slot still carries its declared initial value.
    fn is_default(&self) -> bool;
}
