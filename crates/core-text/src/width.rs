//! Grapheme cluster display width.
//!
//! `egc_width` is the single authority for how many visual columns one
//! extended grapheme cluster (EGC) occupies. Tabs are not handled here: their
//! width depends on the column they start at, see `column::cell_width`.
//!
//! Width rules:
//! - East Asian wide / fullwidth clusters and emoji occupy 2 columns.
//! - Combining marks, joiners and format characters occupy 0 columns and are
//!   carried by the preceding base character (segmentation attaches them).
//! - A cluster made only of zero-width code points (e.g. a combining mark at
//!   the start of a line) is 0 wide.
//! - Everything else is 1 column.
//!
//! The classifier favors over-estimation for pictographic composites; under
//! estimation shifts every following column of a block selection.

/// Semantic classification of a single grapheme cluster (EGC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EgcKind {
    Ascii,
    Narrow,
    Wide,
    ZeroWidth,
    EmojiSimple,     // Single pictographic (with optional VS16) no modifiers
    EmojiModifier,   // Emoji + skin tone modifier
    EmojiKeycap,     // Keycap sequence (base + optional VS16 + \u{20E3})
    EmojiFlag,       // Regional indicator pair
    EmojiZwj,        // ZWJ sequence combining >=2 pictographic bases
    Combining(bool), // Base + combining mark(s); bool indicates base wide/emoji (true => width 2)
    Other,
}

const ZWJ: char = '\u{200D}';
const KEYCAP_COMBINING: char = '\u{20E3}';

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

// Rough Extended Pictographic heuristic (covers most emoji blocks + misc symbols used as emoji)
fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
        || ('\u{1AB0}'..='\u{1AFF}').contains(&c)
        || ('\u{1DC0}'..='\u{1DFF}').contains(&c)
        || ('\u{20D0}'..='\u{20FF}').contains(&c)
        || ('\u{FE20}'..='\u{FE2F}').contains(&c)
}

/// Zero-width code point: combining marks, joiners, variation selectors and
/// other format characters `unicode_width` reports as 0.
pub fn is_zero_width_char(c: char) -> bool {
    is_combining_mark(c) || unicode_width::UnicodeWidthChar::width(c) == Some(0)
}

fn char_width(c: char) -> u16 {
    unicode_width::UnicodeWidthChar::width(c).unwrap_or(1) as u16
}

fn classify(egc: &str) -> EgcKind {
    let mut chars = egc.chars();
    let Some(first) = chars.next() else {
        return EgcKind::Other;
    };
    if egc.chars().all(is_zero_width_char) {
        return EgcKind::ZeroWidth;
    }

    if chars.next().is_none() {
        if first.is_ascii() {
            return EgcKind::Ascii;
        }
        if is_extended_pictographic(first) {
            return EgcKind::EmojiSimple;
        }
        if char_width(first) == 2 {
            return EgcKind::Wide;
        }
        // Ambiguous East Asian width can't be detected without property tables.
        return EgcKind::Narrow;
    }

    let total = egc.chars().count();
    let mut count_ep = 0usize;
    let mut count_ri = 0usize;
    let mut has_zwj = false;
    let mut has_skin = false;
    let mut has_combining = false;
    let mut keycap_base: Option<char> = None;
    let mut ends_with_keycap = false;
    let mut any_wide = false;
    let mut base_wide_or_emoji = false;
    let mut saw_non_mark_base = false;

    for (i, c) in egc.chars().enumerate() {
        if is_extended_pictographic(c) {
            count_ep += 1;
        }
        if is_regional_indicator(c) {
            count_ri += 1;
        }
        if c == ZWJ {
            has_zwj = true;
        }
        if is_skin_tone_modifier(c) {
            has_skin = true;
        }
        if is_combining_mark(c) {
            has_combining = true;
        }
        if c == KEYCAP_COMBINING && i == total - 1 {
            ends_with_keycap = true;
        }
        if keycap_base.is_none() && (c.is_ascii_digit() || c == '#' || c == '*') {
            keycap_base = Some(c);
        }
        if char_width(c) == 2 {
            any_wide = true;
        }
        if !saw_non_mark_base && !is_zero_width_char(c) {
            saw_non_mark_base = true;
            base_wide_or_emoji = is_extended_pictographic(c) || char_width(c) == 2;
        }
    }

    if ends_with_keycap && keycap_base.is_some() {
        return EgcKind::EmojiKeycap;
    }
    if count_ri == 2 && total == 2 {
        return EgcKind::EmojiFlag;
    }
    if has_zwj && count_ep >= 2 {
        return EgcKind::EmojiZwj;
    }
    if count_ep >= 1 && has_skin {
        return EgcKind::EmojiModifier;
    }
    if count_ep == 1 && !has_zwj {
        return EgcKind::EmojiSimple;
    }
    if has_combining {
        return EgcKind::Combining(base_wide_or_emoji);
    }
    if any_wide {
        return EgcKind::Wide;
    }
    if count_ep > 0 {
        return EgcKind::EmojiSimple;
    }
    EgcKind::Narrow
}

#[inline]
fn width_for_kind(kind: EgcKind) -> u16 {
    match kind {
        EgcKind::ZeroWidth => 0,
        EgcKind::Ascii | EgcKind::Narrow | EgcKind::Other => 1,
        EgcKind::Wide
        | EgcKind::EmojiSimple
        | EgcKind::EmojiModifier
        | EgcKind::EmojiKeycap
        | EgcKind::EmojiFlag
        | EgcKind::EmojiZwj => 2,
        EgcKind::Combining(true) => 2,
        EgcKind::Combining(false) => 1,
    }
}

/// Return the display column width for a single grapheme cluster (EGC).
///
/// Precondition: `egc` is one grapheme cluster as produced by
/// `unicode_segmentation`; callers segment once and pass slices. Empty input
/// returns 0. Tabs are measured by the caller.
#[inline]
pub fn egc_width(egc: &str) -> u16 {
    if egc.is_empty() {
        return 0;
    }
    let mut width = width_for_kind(classify(egc));
    // Widen when pictographic / regional indicator signals survived classification.
    if width == 1
        && egc
            .chars()
            .any(|c| is_extended_pictographic(c) || is_regional_indicator(c))
    {
        width = 2;
    }
    width
}
