//! Command binding descriptors.
//!
//! A binding pairs a key sequence with flags and an opaque payload. The
//! dispatch engine inspects only the keys, the flags and the payload kind;
//! what a payload does is up to whoever registered it.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;
use core_events::{KeyInput, KeyInputSet, KeyRemapMode};

use crate::{MotionResult, RegisterName};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CommandFlags: u16 {
        /// Escape is delivered to the binding instead of cancelling it.
        const HANDLES_ESCAPE = 1;
    }
}

/// Arguments resolved for one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandContext {
    pub count: Option<u32>,
    pub register: Option<RegisterName>,
    pub motion: Option<MotionResult>,
}

impl CommandContext {
    /// Count with the usual default of 1.
    pub fn count_or_one(&self) -> u32 {
        self.count.unwrap_or(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Completed,
    Error(String),
}

/// Outcome of feeding one key to a long command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LongCommandStep {
    Complete(CommandResult),
    NeedMoreInput,
    Cancelled,
    Error,
}

/// A command that consumes keys one at a time after its binding matched,
/// e.g. `r{char}` or an insert-like loop.
pub trait LongCommand {
    fn process(&mut self, key: KeyInput) -> LongCommandStep;

    /// Keymap the host should translate input through while this command runs.
    fn remap_mode(&self) -> Option<KeyRemapMode> {
        None
    }
}

pub type CommandFn = Rc<dyn Fn(&CommandContext) -> CommandResult>;
pub type LongCommandStart = Rc<dyn Fn(&CommandContext) -> Box<dyn LongCommand>>;

#[derive(Clone)]
pub enum BindingKind {
    /// Runs as soon as the keys match.
    Simple(CommandFn),
    /// Needs a motion first; the payload runs with `CommandContext::motion` set.
    Motion(CommandFn),
    /// Starts a long command that sees every following key.
    Complex(LongCommandStart),
}

impl BindingKind {
    fn name(&self) -> &'static str {
        match self {
            BindingKind::Simple(_) => "simple",
            BindingKind::Motion(_) => "motion",
            BindingKind::Complex(_) => "complex",
        }
    }
}

impl fmt::Debug for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug)]
pub struct CommandBinding {
    keys: KeyInputSet,
    flags: CommandFlags,
    kind: BindingKind,
}

impl CommandBinding {
    pub fn new(keys: KeyInputSet, flags: CommandFlags, kind: BindingKind) -> Self {
        Self { keys, flags, kind }
    }

    pub fn simple<F>(keys: KeyInputSet, flags: CommandFlags, f: F) -> Self
    where
        F: Fn(&CommandContext) -> CommandResult + 'static,
    {
        Self::new(keys, flags, BindingKind::Simple(Rc::new(f)))
    }

    pub fn motion<F>(keys: KeyInputSet, flags: CommandFlags, f: F) -> Self
    where
        F: Fn(&CommandContext) -> CommandResult + 'static,
    {
        Self::new(keys, flags, BindingKind::Motion(Rc::new(f)))
    }

    pub fn complex<F>(keys: KeyInputSet, flags: CommandFlags, start: F) -> Self
    where
        F: Fn(&CommandContext) -> Box<dyn LongCommand> + 'static,
    {
        Self::new(keys, flags, BindingKind::Complex(Rc::new(start)))
    }

    pub fn keys(&self) -> &KeyInputSet {
        &self.keys
    }

    pub fn flags(&self) -> CommandFlags {
        self.flags
    }

    pub fn kind(&self) -> &BindingKind {
        &self.kind
    }

    pub fn is_motion(&self) -> bool {
        matches!(self.kind, BindingKind::Motion(_))
    }

    pub fn handles_escape(&self) -> bool {
        self.flags.contains(CommandFlags::HANDLES_ESCAPE)
    }
}
