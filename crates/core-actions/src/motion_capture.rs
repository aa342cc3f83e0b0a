use core_events::{KeyInput, KeyRemapMode};
use core_keymap::MotionResult;

/// Result of feeding one key to a motion capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionBind {
    Complete(MotionResult),
    NeedMoreInput,
    Cancelled,
    Error,
}

/// Parses the motion that follows an operator-like binding (`d` + `3w`).
///
/// The runner calls `reset` before handing over the first key of a new
/// motion and after any cancellation.
pub trait MotionCapture {
    fn reset(&mut self);

    fn process(&mut self, key: KeyInput) -> MotionBind;

    fn remap_mode(&self) -> Option<KeyRemapMode> {
        Some(KeyRemapMode::OperatorPending)
    }
}

/// Capture that never produces a motion. Motion bindings bound to a runner
/// built with it error on their first key.
#[derive(Debug, Default)]
pub struct NoMotionCapture;

impl MotionCapture for NoMotionCapture {
    fn reset(&mut self) {}

    fn process(&mut self, _key: KeyInput) -> MotionBind {
        MotionBind::Error
    }
}
