use core_events::{KeyInput, KeyToken, ModMask, NamedKey};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

/// Map a crossterm key event into a `KeyInput`.
///
/// Returns `None` for releases and for key codes that never take part in a
/// binding (e.g. media keys, lone modifier presses).
pub(crate) fn map_key_event(event: &CKeyEvent) -> Option<KeyInput> {
    if matches!(event.kind, CKeyEventKind::Release) {
        return None;
    }
    let token = map_key_token(&event.code)?;
    let mut mods = map_mod_mask(event.modifiers);
    // Terminals report SHIFT alongside already-shifted punctuation ('"', '$');
    // the character itself carries that information.
    if let KeyToken::Char(c) = token
        && !c.is_ascii_alphabetic()
    {
        mods.remove(ModMask::SHIFT);
    }
    if matches!(event.code, CKeyCode::BackTab) {
        mods |= ModMask::SHIFT;
    }
    Some(KeyInput::with_mods(token, mods))
}

/// Convert a crossterm key code into a key token.
pub(crate) fn map_key_token(code: &CKeyCode) -> Option<KeyToken> {
    let token = match code {
        CKeyCode::Char(c) => KeyToken::Char(*c),
        CKeyCode::Enter => KeyToken::Named(NamedKey::Enter),
        CKeyCode::Esc => KeyToken::Named(NamedKey::Esc),
        CKeyCode::Backspace => KeyToken::Named(NamedKey::Backspace),
        CKeyCode::Tab | CKeyCode::BackTab => KeyToken::Named(NamedKey::Tab),
        CKeyCode::Up => KeyToken::Named(NamedKey::Up),
        CKeyCode::Down => KeyToken::Named(NamedKey::Down),
        CKeyCode::Left => KeyToken::Named(NamedKey::Left),
        CKeyCode::Right => KeyToken::Named(NamedKey::Right),
        CKeyCode::Home => KeyToken::Named(NamedKey::Home),
        CKeyCode::End => KeyToken::Named(NamedKey::End),
        CKeyCode::PageUp => KeyToken::Named(NamedKey::PageUp),
        CKeyCode::PageDown => KeyToken::Named(NamedKey::PageDown),
        CKeyCode::Insert => KeyToken::Named(NamedKey::Insert),
        CKeyCode::Delete => KeyToken::Named(NamedKey::Delete),
        CKeyCode::F(n) => KeyToken::Named(NamedKey::F(*n)),
        CKeyCode::Null
        | CKeyCode::CapsLock
        | CKeyCode::ScrollLock
        | CKeyCode::NumLock
        | CKeyCode::PrintScreen
        | CKeyCode::Pause
        | CKeyCode::Menu
        | CKeyCode::KeypadBegin
        | CKeyCode::Media(_)
        | CKeyCode::Modifier(_) => return None,
    };
    Some(token)
}

/// Convert crossterm modifier flags into `ModMask` bits.
pub(crate) fn map_mod_mask(mods: CKeyModifiers) -> ModMask {
    let mut out = ModMask::empty();
    if mods.contains(CKeyModifiers::CONTROL) {
        out |= ModMask::CTRL;
    }
    if mods.contains(CKeyModifiers::ALT) {
        out |= ModMask::ALT;
    }
    if mods.contains(CKeyModifiers::SHIFT) {
        out |= ModMask::SHIFT;
    }
    if mods.contains(CKeyModifiers::SUPER) {
        out |= ModMask::SUPER;
    }
    if mods.contains(CKeyModifiers::META) {
        out |= ModMask::META;
    }
    out
}
