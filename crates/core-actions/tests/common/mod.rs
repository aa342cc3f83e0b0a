#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_actions::{CommandRunner, MotionBind, MotionCapture};
use core_config::RunnerConfig;
use core_events::{KeyInput, KeyInputSet, KeyRemapMode, parse_keys};
use core_keymap::{
    CommandBinding, CommandFlags, CommandResult, LongCommand, LongCommandStep, MotionKind,
    MotionResult,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub fn keys(notation: &str) -> Vec<KeyInput> {
    parse_keys(notation).expect("valid key notation")
}

pub fn key_set(notation: &str) -> KeyInputSet {
    KeyInputSet::from_notation(notation).expect("valid key notation")
}

pub fn runner() -> CommandRunner {
    CommandRunner::new(RunnerConfig::default(), Box::new(ScriptedMotion::default()))
}

/// Run every key of `notation`, returning the last result.
pub fn run(runner: &CommandRunner, notation: &str) -> core_actions::BindResult {
    runner.run_keys(keys(notation))
}

/// Invocation counter shared with a binding's payload.
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<u32>>);

impl Counter {
    pub fn get(&self) -> u32 {
        self.0.get()
    }

    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }
}

pub fn counting_simple(notation: &str, counter: &Counter) -> CommandBinding {
    counting_simple_flags(notation, CommandFlags::empty(), counter)
}

pub fn counting_simple_flags(notation: &str, flags: CommandFlags, counter: &Counter) -> CommandBinding {
    let counter = counter.clone();
    CommandBinding::simple(key_set(notation), flags, move |_| {
        counter.bump();
        CommandResult::Completed
    })
}

pub fn simple(notation: &str) -> CommandBinding {
    CommandBinding::simple(key_set(notation), CommandFlags::empty(), |_| {
        CommandResult::Completed
    })
}

pub fn counting_motion(notation: &str, counter: &Counter) -> CommandBinding {
    counting_motion_flags(notation, CommandFlags::empty(), counter)
}

pub fn counting_motion_flags(notation: &str, flags: CommandFlags, counter: &Counter) -> CommandBinding {
    let counter = counter.clone();
    CommandBinding::motion(key_set(notation), flags, move |ctx| {
        assert!(ctx.motion.is_some(), "motion payload runs with a motion");
        counter.bump();
        CommandResult::Completed
    })
}

/// Motion capture understanding `w`, `j`, `$` and the two-key `iw`.
#[derive(Default)]
pub struct ScriptedMotion {
    typed: String,
}

impl MotionCapture for ScriptedMotion {
    fn reset(&mut self) {
        self.typed.clear();
    }

    fn process(&mut self, key: KeyInput) -> MotionBind {
        if key.is_escape() {
            self.typed.clear();
            return MotionBind::Cancelled;
        }
        let Some(c) = key.as_char() else {
            return MotionBind::Error;
        };
        self.typed.push(c);
        let result = match self.typed.as_str() {
            "w" => MotionResult::new(0..4, MotionKind::CharacterExclusive, true),
            "$" => MotionResult::new(0..9, MotionKind::CharacterInclusive, true),
            "j" => MotionResult::new(0..20, MotionKind::LineWise, true),
            "iw" => MotionResult::new(0..3, MotionKind::CharacterInclusive, true),
            "i" => return MotionBind::NeedMoreInput,
            _ => return MotionBind::Error,
        };
        self.typed.clear();
        MotionBind::Complete(result)
    }
}

/// Long command that collects characters until `<CR>` and records them.
pub struct CollectUntilEnter {
    pub seen: Rc<RefCell<String>>,
    pub remap: Option<KeyRemapMode>,
}

impl LongCommand for CollectUntilEnter {
    fn process(&mut self, key: KeyInput) -> LongCommandStep {
        if key == KeyInput::ENTER {
            return LongCommandStep::Complete(CommandResult::Completed);
        }
        if key.is_escape() {
            self.seen.borrow_mut().push_str("<Esc>");
            return LongCommandStep::NeedMoreInput;
        }
        match key.as_char() {
            Some(c) => {
                self.seen.borrow_mut().push(c);
                LongCommandStep::NeedMoreInput
            }
            None => LongCommandStep::Error,
        }
    }

    fn remap_mode(&self) -> Option<KeyRemapMode> {
        self.remap
    }
}

pub fn collecting(
    notation: &str,
    flags: CommandFlags,
    seen: &Rc<RefCell<String>>,
    remap: Option<KeyRemapMode>,
) -> CommandBinding {
    let seen = seen.clone();
    CommandBinding::complex(key_set(notation), flags, move |_| {
        Box::new(CollectUntilEnter {
            seen: seen.clone(),
            remap,
        })
    })
}
