//! Text geometry for block-wise editing.
//!
//! * `width`: display width of one grapheme cluster.
//! * `column`: translation between visual spaces and character columns on a line.
//! * `block_span`: rectangular selections (`BlockSpan`) and their per-line overlap.
//!
//! Text storage is external; geometry reads lines through [`LineSource`]. A small
//! rope-backed [`Buffer`] implements it for hosts and fixtures.

use anyhow::Result;
use ropey::Rope;
use std::borrow::Cow;

pub mod block_span;
pub mod column;
pub mod width;

pub use block_span::{BlockSpan, OverlapColumn, OverlapColumnSpan, OverlapSpans};
pub use column::{
    Column, get_column_after_spaces_or_end, get_column_for_spaces_or_end,
    get_spaces_to_column_number,
};
pub use width::egc_width;

/// Read access to the lines of a text, newline excluded.
pub trait LineSource {
    fn line_count(&self) -> usize;

    /// Text of `line` without its line terminator; `None` past the end.
    fn line_text(&self, line: usize) -> Option<Cow<'_, str>>;
}

impl<S: AsRef<str>> LineSource for [S] {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.get(line).map(|s| Cow::Borrowed(s.as_ref()))
    }
}

impl<S: AsRef<str>, const N: usize> LineSource for [S; N] {
    fn line_count(&self) -> usize {
        N
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.as_slice().line_text(line)
    }
}

impl<S: AsRef<str>> LineSource for Vec<S> {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.as_slice().line_text(line)
    }
}

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone)]
pub struct Buffer {
    rope: Rope,
    pub name: String,
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        Ok(Self {
            rope: Rope::from_str(content),
            name: name.into(),
        })
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Return the requested line as an owned `String` (including trailing newline if present).
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx < self.rope.len_lines() {
            Some(self.rope.line(idx).to_string())
        } else {
            None
        }
    }

    /// Line content without its terminator (`\n` or `\r\n`).
    pub fn line_content(&self, idx: usize) -> Option<String> {
        let mut s = self.line(idx)?;
        if s.ends_with('\n') {
            s.pop();
            if s.ends_with('\r') {
                s.pop();
            }
        }
        Some(s)
    }

    /// Byte length of a line (excluding any newline) for clamping purposes.
    pub fn line_byte_len(&self, idx: usize) -> usize {
        self.line_content(idx).map_or(0, |s| s.len())
    }

    /// Column at a `(line, char number)` pair, clamped to the buffer.
    pub fn column(&self, line: usize, number: usize) -> Column {
        let line = line.min(self.line_count().saturating_sub(1));
        let text = self.line_content(line).unwrap_or_default();
        Column::from_number(line, &text, number)
    }
}

impl LineSource for Buffer {
    fn line_count(&self) -> usize {
        Buffer::line_count(self)
    }

    fn line_text(&self, line: usize) -> Option<Cow<'_, str>> {
        self.line_content(line).map(Cow::Owned)
    }
}
