//! Key input value types shared by the keymap, the dispatch engine, and host adapters.
//!
//! * `KeyInput` / `KeyInputSet`: one key press and an ordered non-empty sequence.
//! * Key notation parsing (`d<Esc>`, `<C-d>`) for binding tables and tests.
//! * `KeyRemapMode`: which keymap table the host should translate input through.

mod key;
mod notation;

pub use key::{KeyInput, KeyInputSet, KeyToken, ModMask, NamedKey};
pub use notation::parse_keys;

use thiserror::Error;

/// Errors raised while building key sequences from notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyNotationError {
    #[error("key sequence is empty")]
    Empty,
    #[error("unterminated `<` in key notation")]
    Unterminated,
    #[error("unknown key name `<{0}>`")]
    UnknownKey(String),
}

/// Keymap table a host applies to raw input before handing it to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyRemapMode {
    Normal,
    Visual,
    Select,
    OperatorPending,
    Insert,
    Command,
    Language,
}
