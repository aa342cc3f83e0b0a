//! Logical key presses consumed by the dispatch engine.
//!
//! A `KeyInput` is the normalized form of one physical key press: a token
//! (printable character or named key) plus a modifier mask. Hosts build them
//! either directly or through the `core-input` crossterm adapter; the engine
//! only compares them for equality.

use smallvec::SmallVec;
use std::fmt;
use std::ops::Deref;

use crate::KeyNotationError;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct ModMask: u16 { const CTRL=1; const ALT=2; const SHIFT=4; const META=8; const SUPER=16; }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NamedKey {
    Enter,
    Esc,
    Backspace,
    Tab,
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
}

impl NamedKey {
    /// Notation name used inside `<...>`.
    pub fn notation_name(&self) -> String {
        match self {
            NamedKey::Enter => "CR".to_string(),
            NamedKey::Esc => "Esc".to_string(),
            NamedKey::Backspace => "BS".to_string(),
            NamedKey::Tab => "Tab".to_string(),
            NamedKey::F(n) => format!("F{n}"),
            NamedKey::Up => "Up".to_string(),
            NamedKey::Down => "Down".to_string(),
            NamedKey::Left => "Left".to_string(),
            NamedKey::Right => "Right".to_string(),
            NamedKey::Home => "Home".to_string(),
            NamedKey::End => "End".to_string(),
            NamedKey::PageUp => "PageUp".to_string(),
            NamedKey::PageDown => "PageDown".to_string(),
            NamedKey::Insert => "Insert".to_string(),
            NamedKey::Delete => "Del".to_string(),
        }
    }
}

/// Logical key identity: a printable character or a named (non-printing) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyToken {
    Char(char),
    Named(NamedKey),
}

/// One key press. Immutable and cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyInput {
    token: KeyToken,
    mods: ModMask,
}

impl KeyInput {
    pub const ESCAPE: KeyInput = KeyInput::named(NamedKey::Esc);
    pub const ENTER: KeyInput = KeyInput::named(NamedKey::Enter);
    pub const TAB: KeyInput = KeyInput::named(NamedKey::Tab);

    pub const fn char(c: char) -> Self {
        Self {
            token: KeyToken::Char(c),
            mods: ModMask::empty(),
        }
    }

    pub const fn named(key: NamedKey) -> Self {
        Self {
            token: KeyToken::Named(key),
            mods: ModMask::empty(),
        }
    }

    /// Build a key with modifiers applied.
    ///
    /// SHIFT on an ASCII letter is folded into the character case and CTRL
    /// chords on ASCII letters are stored lowercase, so `<C-D>` and `<C-d>`
    /// compare equal while `D` and `<S-d>` do too.
    pub fn with_mods(token: KeyToken, mods: ModMask) -> Self {
        let mut token = token;
        let mut mods = mods;
        if let KeyToken::Char(c) = token
            && c.is_ascii_alphabetic()
        {
            if mods.contains(ModMask::SHIFT) {
                mods.remove(ModMask::SHIFT);
                token = KeyToken::Char(c.to_ascii_uppercase());
            }
            if mods.contains(ModMask::CTRL) {
                token = KeyToken::Char(c.to_ascii_lowercase());
            }
        }
        Self { token, mods }
    }

    pub fn token(&self) -> KeyToken {
        self.token
    }

    pub fn mods(&self) -> ModMask {
        self.mods
    }

    /// Printable character when no command modifier (CTRL/ALT/META/SUPER) is held.
    pub fn as_char(&self) -> Option<char> {
        match self.token {
            KeyToken::Char(c) if (self.mods - ModMask::SHIFT).is_empty() => Some(c),
            _ => None,
        }
    }

    /// Decimal digit value for plain digit keys.
    pub fn digit(&self) -> Option<u32> {
        self.as_char().and_then(|c| c.to_digit(10))
    }

    pub fn is_escape(&self) -> bool {
        *self == Self::ESCAPE
    }
}

impl From<char> for KeyInput {
    fn from(c: char) -> Self {
        KeyInput::char(c)
    }
}

impl From<NamedKey> for KeyInput {
    fn from(key: NamedKey) -> Self {
        KeyInput::named(key)
    }
}

fn mod_prefix(mods: ModMask) -> String {
    let mut out = String::new();
    for (flag, letter) in [
        (ModMask::CTRL, 'C'),
        (ModMask::ALT, 'A'),
        (ModMask::SHIFT, 'S'),
        (ModMask::META, 'M'),
        (ModMask::SUPER, 'D'),
    ] {
        if mods.contains(flag) {
            out.push(letter);
            out.push('-');
        }
    }
    out
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.token {
            KeyToken::Char('<') => "lt".to_string(),
            KeyToken::Char(' ') => "Space".to_string(),
            KeyToken::Char(c) if self.mods.is_empty() => return write!(f, "{c}"),
            KeyToken::Char(c) => c.to_string(),
            KeyToken::Named(n) => n.notation_name(),
        };
        write!(f, "<{}{name}>", mod_prefix(self.mods))
    }
}

/// Ordered, non-empty sequence of key presses identifying a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyInputSet {
    keys: SmallVec<[KeyInput; 4]>,
}

impl KeyInputSet {
    pub fn single(key: KeyInput) -> Self {
        let mut keys = SmallVec::new();
        keys.push(key);
        Self { keys }
    }

    /// Build from an iterator; fails when the iterator yields nothing.
    pub fn new<I: IntoIterator<Item = KeyInput>>(keys: I) -> Result<Self, KeyNotationError> {
        let keys: SmallVec<[KeyInput; 4]> = keys.into_iter().collect();
        if keys.is_empty() {
            return Err(KeyNotationError::Empty);
        }
        Ok(Self { keys })
    }

    /// Every `char` of `text` as a plain key, without notation parsing.
    pub fn from_chars(text: &str) -> Result<Self, KeyNotationError> {
        Self::new(text.chars().map(KeyInput::char))
    }

    pub fn push(&mut self, key: KeyInput) {
        self.keys.push(key);
    }

    pub fn first(&self) -> KeyInput {
        self.keys[0]
    }

    pub fn last(&self) -> KeyInput {
        self.keys[self.keys.len() - 1]
    }

    pub fn as_slice(&self) -> &[KeyInput] {
        &self.keys
    }

    /// True when `prefix` is a (non-strict) prefix of this set.
    pub fn starts_with(&self, prefix: &[KeyInput]) -> bool {
        self.keys.starts_with(prefix)
    }
}

impl Deref for KeyInputSet {
    type Target = [KeyInput];

    fn deref(&self) -> &[KeyInput] {
        &self.keys
    }
}

impl From<KeyInput> for KeyInputSet {
    fn from(key: KeyInput) -> Self {
        KeyInputSet::single(key)
    }
}

impl fmt::Display for KeyInputSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.keys {
            write!(f, "{key}")?;
        }
        Ok(())
    }
}
