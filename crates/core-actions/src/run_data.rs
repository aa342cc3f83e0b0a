use core_keymap::{CommandBinding, CommandContext, MotionResult, RegisterName};

/// Everything resolved for one completed command.
#[derive(Debug, Clone)]
pub struct CommandRunData {
    pub binding: CommandBinding,
    /// `None` when no count digits were typed.
    pub count: Option<u32>,
    /// `None` when no `"x` prefix was typed.
    pub register: Option<RegisterName>,
    /// Set for motion bindings only.
    pub motion: Option<MotionResult>,
}

impl CommandRunData {
    pub fn register_or(&self, default: RegisterName) -> RegisterName {
        self.register.unwrap_or(default)
    }

    pub fn count_or_one(&self) -> u32 {
        self.count.unwrap_or(1)
    }

    pub fn context(&self) -> CommandContext {
        CommandContext {
            count: self.count,
            register: self.register,
            motion: self.motion.clone(),
        }
    }
}

/// Outcome of feeding one key to the runner.
#[derive(Debug, Clone)]
pub enum BindResult {
    Completed(CommandRunData),
    Cancelled,
    Error,
    NeedMoreInput,
}

impl BindResult {
    pub fn is_completed(&self) -> bool {
        matches!(self, BindResult::Completed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, BindResult::Cancelled)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, BindResult::Error)
    }

    pub fn is_need_more_input(&self) -> bool {
        matches!(self, BindResult::NeedMoreInput)
    }

    pub fn run_data(&self) -> Option<&CommandRunData> {
        match self {
            BindResult::Completed(data) => Some(data),
            _ => None,
        }
    }
}
