//! core-actions: the command dispatch engine.
//!
//! `CommandRunner` turns a stream of `KeyInput`s into completed commands,
//! composing count and register prefixes with binding resolution from a
//! `core_keymap::BindingTable`. Motions for operator-like bindings are parsed
//! by a host supplied `MotionCapture`.
//!
//! The engine never touches text, registers or settings itself; a completed
//! command is reported as `CommandRunData` to the caller and to `CommandRan`
//! observers.

mod motion_capture;
mod run_data;
mod runner;

pub use motion_capture::{MotionBind, MotionCapture, NoMotionCapture};
pub use run_data::{BindResult, CommandRunData};
pub use runner::{CommandRunner, RunnerStatus};
