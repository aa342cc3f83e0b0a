//! Key notation parsing (`d<Esc>`, `<C-d>`, `"c2a`).
//!
//! Plain characters map to themselves. A `<` opens a bracketed token that
//! must be closed by `>`; inside, any number of `X-` modifier prefixes may
//! precede a single character or a named key. A bare `<` is written `<lt>`.

use crate::{KeyInput, KeyInputSet, KeyNotationError, KeyToken, ModMask, NamedKey};
use std::str::FromStr;
use tracing::trace;

fn named_key(name: &str) -> Option<KeyToken> {
    let lower = name.to_ascii_lowercase();
    let named = match lower.as_str() {
        "esc" | "escape" => NamedKey::Esc,
        "cr" | "enter" | "return" => NamedKey::Enter,
        "bs" | "backspace" => NamedKey::Backspace,
        "tab" => NamedKey::Tab,
        "up" => NamedKey::Up,
        "down" => NamedKey::Down,
        "left" => NamedKey::Left,
        "right" => NamedKey::Right,
        "home" => NamedKey::Home,
        "end" => NamedKey::End,
        "pageup" => NamedKey::PageUp,
        "pagedown" => NamedKey::PageDown,
        "insert" => NamedKey::Insert,
        "del" | "delete" => NamedKey::Delete,
        "lt" => return Some(KeyToken::Char('<')),
        "space" => return Some(KeyToken::Char(' ')),
        "bar" => return Some(KeyToken::Char('|')),
        "bslash" => return Some(KeyToken::Char('\\')),
        _ => {
            let n = lower.strip_prefix('f')?.parse::<u8>().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            NamedKey::F(n)
        }
    };
    Some(KeyToken::Named(named))
}

fn modifier(letter: char) -> Option<ModMask> {
    match letter.to_ascii_uppercase() {
        'C' => Some(ModMask::CTRL),
        'A' => Some(ModMask::ALT),
        'S' => Some(ModMask::SHIFT),
        'M' => Some(ModMask::META),
        'D' => Some(ModMask::SUPER),
        _ => None,
    }
}

/// Parse the body of a `<...>` token.
fn parse_bracketed(body: &str) -> Result<KeyInput, KeyNotationError> {
    let mut mods = ModMask::empty();
    let mut rest = body;
    loop {
        let mut chars = rest.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), Some('-')) if rest.len() > 2 => match modifier(letter) {
                Some(m) => {
                    mods |= m;
                    rest = &rest[2..];
                }
                None => break,
            },
            _ => break,
        }
    }
    let mut chars = rest.chars();
    let token = match (chars.next(), chars.next()) {
        (Some(c), None) if !mods.is_empty() => KeyToken::Char(c),
        _ => named_key(rest).ok_or_else(|| KeyNotationError::UnknownKey(body.to_string()))?,
    };
    Ok(KeyInput::with_mods(token, mods))
}

/// Parse a whole notation string into its key presses.
pub fn parse_keys(text: &str) -> Result<Vec<KeyInput>, KeyNotationError> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(c) = rest.chars().next() {
        if c == '<' {
            let close = rest.find('>').ok_or(KeyNotationError::Unterminated)?;
            out.push(parse_bracketed(&rest[1..close])?);
            rest = &rest[close + 1..];
        } else {
            out.push(KeyInput::char(c));
            rest = &rest[c.len_utf8()..];
        }
    }
    trace!(target: "input.keys", len = out.len(), "notation_parsed");
    Ok(out)
}

impl KeyInputSet {
    /// Parse vim-style key notation; see module docs for the grammar.
    pub fn from_notation(text: &str) -> Result<Self, KeyNotationError> {
        KeyInputSet::new(parse_keys(text)?)
    }
}

impl FromStr for KeyInputSet {
    type Err = KeyNotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyInputSet::from_notation(s)
    }
}
