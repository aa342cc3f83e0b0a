//! Column geometry over a single line: visual spaces vs. character columns.
//!
//! A line is walked as a sequence of cells, one per grapheme cluster. Each
//! cell starts at a character column number and occupies a number of visual
//! spaces:
//! - a tab extends to the next multiple of the tab stop, so its width depends
//!   on the space it starts at;
//! - wide clusters take 2 spaces;
//! - zero-width code points ride along with the preceding base character and
//!   never start a selectable cell of their own.
//!
//! Every lookup clamps to the line; none of them fail.

use crate::width::egc_width;
use unicode_segmentation::UnicodeSegmentation;

/// A character position on a line.
///
/// `number` counts `char`s from the start of the line; `byte` is the matching
/// UTF-8 offset into the line text (newline excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column {
    pub line: usize,
    pub number: usize,
    pub byte: usize,
}

impl Column {
    pub const fn new(line: usize, number: usize, byte: usize) -> Self {
        Self { line, number, byte }
    }

    pub const fn start_of(line: usize) -> Self {
        Self::new(line, 0, 0)
    }

    /// Column one past the last character of `text`.
    pub fn end_of(line: usize, text: &str) -> Self {
        Self::new(line, text.chars().count(), text.len())
    }

    /// Column for a character number, clamped to the end of the line.
    pub fn from_number(line: usize, text: &str, number: usize) -> Self {
        match text.char_indices().nth(number) {
            Some((byte, _)) => Self::new(line, number, byte),
            None => Self::end_of(line, text),
        }
    }

    pub fn is_line_end(&self, text: &str) -> bool {
        self.byte >= text.len()
    }
}

/// One grapheme cluster of a line with its visual extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell<'a> {
    pub number: usize,
    pub byte: usize,
    pub text: &'a str,
    /// Visual space the cell starts at.
    pub start: usize,
    pub width: usize,
}

impl Cell<'_> {
    pub fn end(&self) -> usize {
        self.start + self.width
    }

    pub fn column(&self, line: usize) -> Column {
        Column::new(line, self.number, self.byte)
    }
}

/// Width of `egc` when it starts at visual space `start`.
pub fn cell_width(egc: &str, start: usize, tab_stop: usize) -> usize {
    if egc == "\t" {
        tab_stop - start % tab_stop
    } else {
        egc_width(egc) as usize
    }
}

/// Iterator over the cells of one line.
pub struct Cells<'a> {
    inner: unicode_segmentation::GraphemeIndices<'a>,
    tab_stop: usize,
    number: usize,
    spaces: usize,
}

impl<'a> Iterator for Cells<'a> {
    type Item = Cell<'a>;

    fn next(&mut self) -> Option<Cell<'a>> {
        let (byte, text) = self.inner.next()?;
        let width = cell_width(text, self.spaces, self.tab_stop);
        let cell = Cell {
            number: self.number,
            byte,
            text,
            start: self.spaces,
            width,
        };
        self.number += text.chars().count();
        self.spaces += width;
        Some(cell)
    }
}

/// Walk the cells of `text` with the given tab stop (must be >= 1).
pub fn cells(text: &str, tab_stop: usize) -> Cells<'_> {
    debug_assert!(tab_stop >= 1, "tab stop must be positive");
    Cells {
        inner: text.grapheme_indices(true),
        tab_stop,
        number: 0,
        spaces: 0,
    }
}

/// Total visual width of a line.
pub fn line_spaces(text: &str, tab_stop: usize) -> usize {
    cells(text, tab_stop).last().map_or(0, |c| c.end())
}

/// Visual spaces consumed by every character strictly before `column_number`.
///
/// A number past the end of the line yields the width of the whole line. A
/// number pointing at a zero-width character counts its base character.
pub fn get_spaces_to_column_number(text: &str, column_number: usize, tab_stop: usize) -> usize {
    cells(text, tab_stop)
        .take_while(|c| c.number < column_number)
        .last()
        .map_or(0, |c| c.end())
}

/// Column of the cell covering visual space `spaces`, or the end of the line
/// when `spaces` is at or beyond the line's width.
///
/// A space inside a tab or a wide character resolves to that character (at or
/// before the requested space).
pub fn get_column_for_spaces_or_end(
    line: usize,
    text: &str,
    spaces: usize,
    tab_stop: usize,
) -> Column {
    cells(text, tab_stop)
        .find(|c| spaces < c.end())
        .map_or_else(|| Column::end_of(line, text), |c| c.column(line))
}

/// Like [`get_column_for_spaces_or_end`], but a space strictly inside a
/// multi-space cell resolves to the column after that cell: no buffer offset
/// exists at that visual position.
pub fn get_column_after_spaces_or_end(
    line: usize,
    text: &str,
    spaces: usize,
    tab_stop: usize,
) -> Column {
    let mut iter = cells(text, tab_stop);
    while let Some(cell) = iter.next() {
        if spaces < cell.end() {
            if spaces <= cell.start {
                return cell.column(line);
            }
            return iter
                .next()
                .map_or_else(|| Column::end_of(line, text), |next| next.column(line));
        }
    }
    Column::end_of(line, text)
}
