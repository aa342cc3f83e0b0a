//! core-keymap: command bindings and the table they are matched against.
//!
//! * `CommandBinding`: key sequence + `CommandFlags` + payload kind
//!   (simple, motion, or long/complex).
//! * `BindingTable`: bindings compiled into a key trie. Resolution of a
//!   partial sequence reports a terminal match, an ambiguous match (exact and
//!   longer bindings both exist), a strict prefix, or no match.
//! * `MotionResult` and `RegisterName`: values carried into a command's
//!   `CommandContext`.
//!
//! No side effects: logging only at TRACE for traversal steps.

mod binding;
mod motion;
mod register;
mod table;

pub use binding::{
    BindingKind, CommandBinding, CommandContext, CommandFlags, CommandFn, CommandResult,
    LongCommand, LongCommandStart, LongCommandStep,
};
pub use motion::{MotionKind, MotionResult};
pub use register::RegisterName;
pub use table::{BindingTable, Resolution};

use core_events::KeyInputSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeymapError {
    #[error("a binding for `{0}` is already registered")]
    DuplicateBinding(KeyInputSet),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("`{0}` is not a register name")]
pub struct RegisterNameError(pub char);
