//! CommandRunner: incremental key dispatch against a binding table.
//!
//! One key per `run` call. The runner keeps its session between calls:
//! * a pending count (`1`-`9` starts one, `0` only extends),
//! * a pending register (`"` followed by a register name),
//! * the partial key sequence matched so far,
//! * an active motion binding (keys go to the `MotionCapture`) or an active
//!   long command (keys go to the command itself).
//!
//! Resolution of the partial sequence:
//! * exact match with no longer binding: a simple binding executes, a motion
//!   binding waits for its motion, a complex binding starts its long command;
//! * exact match that longer bindings extend: keep waiting;
//! * strict prefix: keep waiting;
//! * no match: the longest motion binding that is a strict prefix of the
//!   partial sequence is bound and the remaining keys are replayed into the
//!   motion capture, otherwise the sequence is an error. Keys left over once
//!   the motion completes are dispatched again from the idle state, so `run`
//!   reports the outcome of the last key it was given.
//!
//! Escape cancels everything unless the binding in charge declares
//! `HANDLES_ESCAPE`. While matching, that is any binding under the typed
//! prefix, or the motion binding the prefix would fall back to.
//!
//! A partial sequence that ends in (or passes through) a motion binding
//! reports the motion capture's remap mode, since the next key may be the
//! motion.
//!
//! Re-entrancy: `run` refuses to be called while a key is being resolved
//! (from a long command, a motion capture, or the table lookup). Simple
//! payloads and `CommandRan` observers run after resolution finished and may
//! call `run` again to replay keys.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use smallvec::SmallVec;
use tracing::{debug, warn};

use core_config::RunnerConfig;
use core_events::{KeyInput, KeyRemapMode};
use core_keymap::{
    BindingKind, BindingTable, CommandBinding, CommandContext, CommandFn, CommandResult,
    KeymapError, LongCommand, LongCommandStep, RegisterName, Resolution,
};

use crate::{BindResult, CommandRunData, MotionBind, MotionCapture};

type CommandRanFn = Rc<dyn Fn(&CommandRunData)>;

/// Coarse view of where the runner is in a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerStatus {
    Idle,
    AccumulatingCount,
    AccumulatingRegister,
    MatchingPrefix,
    AwaitingMotion,
    InLongCommand,
}

#[derive(Default)]
enum Active {
    #[default]
    None,
    Motion(CommandBinding),
    Long(CommandBinding, Box<dyn LongCommand>),
}

#[derive(Default)]
struct RunnerState {
    partial: SmallVec<[KeyInput; 4]>,
    count: Option<u32>,
    register: Option<RegisterName>,
    awaiting_register: bool,
    active: Active,
}

impl RunnerState {
    fn clear(&mut self) {
        *self = RunnerState::default();
    }

    fn run_data(&self, binding: CommandBinding) -> CommandRunData {
        CommandRunData {
            binding,
            count: self.count,
            register: self.register,
            motion: None,
        }
    }
}

enum Lookup {
    Bind(CommandBinding),
    Wait,
    Cancel,
    /// No binding matches; carries the motion prefix to fall back to, if any.
    Diverge(Option<CommandBinding>),
}

/// What a resolved key asks of `run` once the in-bind guard is released.
enum Step {
    Done(BindResult),
    Execute(CommandRunData, Option<CommandFn>),
    /// Finish the inner step, then dispatch the keys it did not consume.
    Replay(Box<Step>, SmallVec<[KeyInput; 4]>),
}

struct BindGuard<'a>(&'a Cell<bool>);

impl<'a> BindGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for BindGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub struct CommandRunner {
    config: RunnerConfig,
    table: RefCell<BindingTable>,
    state: RefCell<RunnerState>,
    capture: RefCell<Box<dyn MotionCapture>>,
    observers: RefCell<Vec<CommandRanFn>>,
    in_bind: Cell<bool>,
}

impl CommandRunner {
    pub fn new(config: RunnerConfig, capture: Box<dyn MotionCapture>) -> Self {
        Self {
            config,
            table: RefCell::new(BindingTable::new()),
            state: RefCell::new(RunnerState::default()),
            capture: RefCell::new(capture),
            observers: RefCell::new(Vec::new()),
            in_bind: Cell::new(false),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    // ---------------------------------------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------------------------------------

    pub fn add(&self, binding: CommandBinding) -> Result<(), KeymapError> {
        self.table.borrow_mut().add(binding)
    }

    /// Remove the binding for `keys`; absent keys are ignored.
    pub fn remove(&self, keys: &[KeyInput]) {
        self.table.borrow_mut().remove(keys);
    }

    pub fn commands(&self) -> Vec<CommandBinding> {
        self.table.borrow().commands().cloned().collect()
    }

    pub fn has_binding(&self, keys: &[KeyInput]) -> bool {
        self.table.borrow().contains(keys)
    }

    pub fn binding_count(&self) -> usize {
        self.table.borrow().len()
    }

    /// Register a `CommandRan` observer. Observers fire once per completed
    /// command, before `run` returns.
    pub fn subscribe<F>(&self, observer: F)
    where
        F: Fn(&CommandRunData) + 'static,
    {
        self.observers.borrow_mut().push(Rc::new(observer));
    }

    // ---------------------------------------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------------------------------------

    pub fn is_waiting_for_more_input(&self) -> bool {
        self.status() != RunnerStatus::Idle
    }

    pub fn in_count(&self) -> bool {
        self.status() == RunnerStatus::AccumulatingCount
    }

    pub fn pending_count(&self) -> Option<u32> {
        self.state.borrow().count
    }

    pub fn pending_register(&self) -> Option<RegisterName> {
        self.state.borrow().register
    }

    /// True while a key is being resolved; `run` is refused meanwhile.
    pub fn in_binding(&self) -> bool {
        self.in_bind.get()
    }

    pub fn status(&self) -> RunnerStatus {
        let s = self.state.borrow();
        match s.active {
            Active::Motion(_) => RunnerStatus::AwaitingMotion,
            Active::Long(..) => RunnerStatus::InLongCommand,
            Active::None if s.awaiting_register => RunnerStatus::AccumulatingRegister,
            Active::None if !s.partial.is_empty() => RunnerStatus::MatchingPrefix,
            Active::None if s.count.is_some() => RunnerStatus::AccumulatingCount,
            Active::None if s.register.is_some() => RunnerStatus::AccumulatingRegister,
            Active::None => RunnerStatus::Idle,
        }
    }

    /// Keymap the host should translate the next key through.
    pub fn key_remap_mode(&self) -> Option<KeyRemapMode> {
        let s = self.state.borrow();
        match &s.active {
            Active::None if s.partial.is_empty() => None,
            Active::None => {
                let motion_pending = self.table.try_borrow().is_ok_and(|table| {
                    table.get(&s.partial).is_some_and(CommandBinding::is_motion)
                        || table.longest_motion_prefix(&s.partial).is_some()
                });
                if motion_pending {
                    self.capture_remap_mode()
                } else {
                    None
                }
            }
            Active::Motion(_) => self.capture_remap_mode(),
            Active::Long(_, command) => command.remap_mode(),
        }
    }

    fn capture_remap_mode(&self) -> Option<KeyRemapMode> {
        self.capture
            .try_borrow()
            .map_or(Some(KeyRemapMode::OperatorPending), |c| c.remap_mode())
    }

    /// Drop count, register, partial keys and any active motion or long command.
    pub fn reset_state(&self) {
        self.state.borrow_mut().clear();
        if let Ok(mut capture) = self.capture.try_borrow_mut() {
            capture.reset();
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------------------------------------

    pub fn run(&self, key: KeyInput) -> BindResult {
        if self.in_bind.get() {
            warn!(target: "actions.runner", key = %key, "reentrant_run_rejected");
            return BindResult::Error;
        }
        let step = {
            let _guard = BindGuard::enter(&self.in_bind);
            self.resolve(key)
        };
        self.finish(key, step)
    }

    /// Feed every key in order, returning the last result.
    pub fn run_keys<I>(&self, keys: I) -> BindResult
    where
        I: IntoIterator<Item = KeyInput>,
    {
        let mut last = BindResult::NeedMoreInput;
        for key in keys {
            last = self.run(key);
        }
        last
    }

    /// Carry out a resolved step. Runs with the in-bind guard released.
    fn finish(&self, key: KeyInput, step: Step) -> BindResult {
        match step {
            Step::Done(result) => {
                match &result {
                    BindResult::Cancelled => {
                        debug!(target: "actions.runner", key = %key, "bind_cancelled")
                    }
                    BindResult::Error => debug!(target: "actions.runner", key = %key, "bind_error"),
                    _ => {}
                }
                result
            }
            Step::Execute(data, payload) => self.execute(data, payload),
            Step::Replay(step, leftover) => {
                debug!(target: "actions.runner", keys = leftover.len(), "motion_leftover_replayed");
                let first = self.finish(key, *step);
                leftover.into_iter().fold(first, |_, key| self.run(key))
            }
        }
    }

    fn execute(&self, data: CommandRunData, payload: Option<CommandFn>) -> BindResult {
        if let Some(f) = payload
            && let CommandResult::Error(msg) = f(&data.context())
        {
            debug!(
                target: "actions.runner",
                keys = %data.binding.keys(),
                error = %msg,
                "bind_error"
            );
            return BindResult::Error;
        }
        debug!(
            target: "actions.runner",
            keys = %data.binding.keys(),
            count = ?data.count,
            register = ?data.register.map(|r| r.as_char()),
            "command_ran"
        );
        let observers: Vec<CommandRanFn> = self.observers.borrow().clone();
        for observer in observers {
            observer(&data);
        }
        BindResult::Completed(data)
    }

    fn resolve(&self, key: KeyInput) -> Step {
        let active = std::mem::take(&mut self.state.borrow_mut().active);
        match active {
            Active::Long(binding, command) => self.step_long(binding, command, key),
            Active::Motion(binding) => self.step_motion(binding, key),
            Active::None => self.step_match(key),
        }
    }

    fn cancel(&self) -> Step {
        self.reset_state();
        Step::Done(BindResult::Cancelled)
    }

    fn fail(&self) -> Step {
        self.reset_state();
        Step::Done(BindResult::Error)
    }

    fn step_long(
        &self,
        binding: CommandBinding,
        mut command: Box<dyn LongCommand>,
        key: KeyInput,
    ) -> Step {
        if key.is_escape() && !binding.handles_escape() {
            return self.cancel();
        }
        match command.process(key) {
            LongCommandStep::NeedMoreInput => {
                self.state.borrow_mut().active = Active::Long(binding, command);
                Step::Done(BindResult::NeedMoreInput)
            }
            LongCommandStep::Complete(CommandResult::Completed) => {
                let data = self.state.borrow().run_data(binding);
                self.reset_state();
                Step::Execute(data, None)
            }
            LongCommandStep::Complete(CommandResult::Error(msg)) => {
                debug!(
                    target: "actions.runner",
                    keys = %binding.keys(),
                    error = %msg,
                    "long_command_failed"
                );
                self.fail()
            }
            LongCommandStep::Cancelled => self.cancel(),
            LongCommandStep::Error => self.fail(),
        }
    }

    fn step_motion(&self, binding: CommandBinding, key: KeyInput) -> Step {
        if key.is_escape() && !binding.handles_escape() {
            return self.cancel();
        }
        let outcome = self.capture.borrow_mut().process(key);
        match outcome {
            MotionBind::NeedMoreInput => {
                self.state.borrow_mut().active = Active::Motion(binding);
                Step::Done(BindResult::NeedMoreInput)
            }
            MotionBind::Complete(motion) => {
                let payload = match binding.kind() {
                    BindingKind::Motion(f) => Some(f.clone()),
                    _ => None,
                };
                let mut data = self.state.borrow().run_data(binding);
                data.motion = Some(motion);
                self.reset_state();
                Step::Execute(data, payload)
            }
            MotionBind::Cancelled => self.cancel(),
            MotionBind::Error => self.fail(),
        }
    }

    fn step_match(&self, key: KeyInput) -> Step {
        let mut s = self.state.borrow_mut();

        if s.awaiting_register {
            if key.is_escape() {
                drop(s);
                return self.cancel();
            }
            return match key.as_char().map(RegisterName::new) {
                Some(Ok(name)) => {
                    s.awaiting_register = false;
                    s.register = Some(name);
                    debug!(target: "input.context", register = %name.as_char(), "register_set");
                    Step::Done(BindResult::NeedMoreInput)
                }
                _ => {
                    debug!(target: "input.context", key = %key, "register_invalid");
                    drop(s);
                    self.fail()
                }
            };
        }

        if s.partial.is_empty() {
            if let Some(digit) = key.digit()
                && (digit != 0 || s.count.is_some())
            {
                let value = s
                    .count
                    .unwrap_or(0)
                    .saturating_mul(10)
                    .saturating_add(digit)
                    .min(self.config.max_count);
                s.count = Some(value);
                debug!(target: "input.context", count = value, digit, "count_extend");
                return Step::Done(BindResult::NeedMoreInput);
            }
            if key.as_char() == Some('"') && s.register.is_none() {
                s.awaiting_register = true;
                debug!(target: "input.context", "register_prefix");
                return Step::Done(BindResult::NeedMoreInput);
            }
        }

        s.partial.push(key);
        let lookup = {
            let table = self.table.borrow();
            if key.is_escape() && !table.any_under(&s.partial, CommandBinding::handles_escape) {
                match table.longest_motion_prefix(&s.partial) {
                    Some(motion) if motion.handles_escape() => {
                        Lookup::Diverge(Some(motion.clone()))
                    }
                    _ => Lookup::Cancel,
                }
            } else {
                match table.resolve(&s.partial) {
                    Resolution::Matched(binding) => Lookup::Bind(binding.clone()),
                    Resolution::Ambiguous(_) | Resolution::NeedMore => Lookup::Wait,
                    Resolution::NoMatch => {
                        Lookup::Diverge(table.longest_motion_prefix(&s.partial).cloned())
                    }
                }
            }
        };

        let matched = match lookup {
            Lookup::Bind(binding) => binding,
            Lookup::Wait => return Step::Done(BindResult::NeedMoreInput),
            Lookup::Cancel => {
                drop(s);
                return self.cancel();
            }
            Lookup::Diverge(Some(binding)) => {
                let rest: SmallVec<[KeyInput; 4]> =
                    s.partial[binding.keys().len()..].iter().copied().collect();
                drop(s);
                return self.replay_into_motion(binding, &rest);
            }
            Lookup::Diverge(None) => {
                drop(s);
                return self.fail();
            }
        };

        match matched.kind().clone() {
            BindingKind::Simple(f) => {
                let data = s.run_data(matched);
                drop(s);
                self.reset_state();
                Step::Execute(data, Some(f))
            }
            BindingKind::Motion(_) => {
                s.partial.clear();
                s.active = Active::Motion(matched);
                drop(s);
                self.capture.borrow_mut().reset();
                Step::Done(BindResult::NeedMoreInput)
            }
            BindingKind::Complex(start) => {
                s.partial.clear();
                let ctx = CommandContext {
                    count: s.count,
                    register: s.register,
                    motion: None,
                };
                drop(s);
                let command = start(&ctx);
                debug!(target: "actions.runner", keys = %matched.keys(), "long_command_started");
                self.state.borrow_mut().active = Active::Long(matched, command);
                Step::Done(BindResult::NeedMoreInput)
            }
        }
    }

    /// Bind `binding` as the pending motion command and feed `rest` to the
    /// motion capture. Keys after a completed motion are handed back for
    /// dispatch; after a failed or cancelled motion they are discarded.
    fn replay_into_motion(&self, binding: CommandBinding, rest: &[KeyInput]) -> Step {
        debug!(
            target: "actions.runner",
            keys = %binding.keys(),
            replay = rest.len(),
            "motion_bound_on_divergence"
        );
        {
            let mut s = self.state.borrow_mut();
            s.partial.clear();
            s.active = Active::Motion(binding);
        }
        self.capture.borrow_mut().reset();
        for (i, key) in rest.iter().enumerate() {
            let active = std::mem::take(&mut self.state.borrow_mut().active);
            let Active::Motion(binding) = active else {
                return Step::Done(BindResult::Error);
            };
            let step = self.step_motion(binding, *key);
            if matches!(step, Step::Done(BindResult::NeedMoreInput)) {
                continue;
            }
            let leftover = &rest[i + 1..];
            if leftover.is_empty() {
                return step;
            }
            return match step {
                Step::Execute(..) => {
                    Step::Replay(Box::new(step), leftover.iter().copied().collect())
                }
                _ => {
                    debug!(
                        target: "actions.runner",
                        dropped = leftover.len(),
                        "motion_replay_truncated"
                    );
                    step
                }
            };
        }
        Step::Done(BindResult::NeedMoreInput)
    }
}
