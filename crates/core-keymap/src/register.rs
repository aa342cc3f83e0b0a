use std::fmt;

use crate::RegisterNameError;

/// Name of a register selected with a `"x` prefix.
///
/// Storage lives elsewhere; this type only validates the key typed after `"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegisterName(char);

impl RegisterName {
    pub const UNNAMED: RegisterName = RegisterName('"');

    pub fn new(c: char) -> Result<Self, RegisterNameError> {
        let valid = c.is_ascii_alphanumeric()
            || matches!(c, '"' | '-' | '*' | '+' | '_' | '/' | ':' | '.' | '%' | '#' | '=');
        if valid {
            Ok(Self(c))
        } else {
            Err(RegisterNameError(c))
        }
    }

    pub fn as_char(&self) -> char {
        self.0
    }

    /// `A`-`Z` select the lowercase register in append mode.
    pub fn is_append(&self) -> bool {
        self.0.is_ascii_uppercase()
    }
}

impl TryFrom<char> for RegisterName {
    type Error = RegisterNameError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        RegisterName::new(c)
    }
}

impl Default for RegisterName {
    fn default() -> Self {
        RegisterName::UNNAMED
    }
}

impl fmt::Display for RegisterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}", self.0)
    }
}
