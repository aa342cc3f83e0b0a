//! Host adapter: translate crossterm key events into `KeyInput` values for the
//! dispatch engine.

mod key_token;

use core_events::KeyInput;
use crossterm::event::KeyEvent as CKeyEvent;

/// Translate one terminal key event. `None` means the event carries no key
/// the engine should see (release, media key, lone modifier).
pub fn key_input_from_event(event: &CKeyEvent) -> Option<KeyInput> {
    let mapped = key_token::map_key_event(event);
    log_key_mapping(mapped.is_some());
    mapped
}

#[inline]
pub(crate) fn log_key_mapping(mapped: bool) {
    tracing::trace!(target: "input.keys", mapped, "host_key_event");
}
