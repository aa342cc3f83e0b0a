//! Rectangular (block-wise) spans measured in visual spaces.
//!
//! A `BlockSpan` is anchored at a column, extends `spaces` visual columns to
//! the right of the anchor's visual position and `height` lines down
//! (anchor line included). The visual position of the anchor ("before
//! spaces") is measured on the anchor line and applied to every line of the
//! block, so tabs and wide characters on other lines may be only partially
//! covered.

use crate::LineSource;
use crate::column::{self, Cell, Column};
use std::fmt;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSpan {
    start: Column,
    tab_stop: usize,
    spaces: usize,
    height: usize,
}

impl BlockSpan {
    /// Create a block anchored at `start`.
    ///
    /// # Panics
    /// When `tab_stop` or `height` is zero.
    pub fn new(start: Column, tab_stop: usize, spaces: usize, height: usize) -> Self {
        assert!(tab_stop >= 1, "block span tab stop must be >= 1");
        assert!(height >= 1, "block span height must be >= 1");
        Self {
            start,
            tab_stop,
            spaces,
            height,
        }
    }

    /// Create a block whose left edge sits `before_spaces` visual columns into
    /// `line`. A left edge inside a tab anchors on the tab itself.
    pub fn from_spaces<L: LineSource + ?Sized>(
        lines: &L,
        line: usize,
        before_spaces: usize,
        spaces: usize,
        height: usize,
        tab_stop: usize,
    ) -> Self {
        assert!(tab_stop >= 1, "block span tab stop must be >= 1");
        let text = lines.line_text(line).unwrap_or_default();
        let start = column::get_column_for_spaces_or_end(line, &text, before_spaces, tab_stop);
        Self::new(start, tab_stop, spaces, height)
    }

    pub fn start(&self) -> Column {
        self.start
    }

    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    pub fn spaces(&self) -> usize {
        self.spaces
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Last line number covered by the block (may lie past the buffer end).
    /// Saturates at `usize::MAX`.
    pub fn last_line(&self) -> usize {
        self.start.line.saturating_add(self.height - 1)
    }

    /// Visual column of the anchor on its own line.
    pub fn before_spaces<L: LineSource + ?Sized>(&self, lines: &L) -> usize {
        let text = lines.line_text(self.start.line).unwrap_or_default();
        column::get_spaces_to_column_number(&text, self.start.number, self.tab_stop)
    }

    /// Column one past the last covered character of the last line.
    ///
    /// When the right edge falls inside a tab or wide character, the end is
    /// the column after that character. Lines past the buffer end clamp to
    /// the last line.
    pub fn end<L: LineSource + ?Sized>(&self, lines: &L) -> Column {
        let right = self.before_spaces(lines).saturating_add(self.spaces);
        let last_existing = lines.line_count().saturating_sub(1);
        let line = self.last_line().min(last_existing);
        if line != self.last_line() {
            trace!(target: "text.block", requested = self.last_line(), clamped = line, "block_end_clamped");
        }
        let text = lines.line_text(line).unwrap_or_default();
        column::get_column_after_spaces_or_end(line, &text, right, self.tab_stop)
    }

    /// Lazily computed covered spans, one per line of the block that exists.
    ///
    /// The iterator borrows `lines`; it must be re-derived after the text
    /// changes rather than kept across an edit.
    pub fn overlap_spans<'a, L: LineSource + ?Sized>(&self, lines: &'a L) -> OverlapSpans<'a, L> {
        let left = self.before_spaces(lines);
        let end_line = self.last_line().saturating_add(1).min(lines.line_count());
        OverlapSpans {
            lines,
            next_line: self.start.line,
            end_line,
            left,
            right: left.saturating_add(self.spaces),
            tab_stop: self.tab_stop,
        }
    }
}

/// A column that may be only partially inside a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapColumn {
    pub column: Column,
    /// Spaces of this character that lie before the boundary.
    pub spaces_before: usize,
    /// Total visual width of the character (0 at line end).
    pub width: usize,
}

impl OverlapColumn {
    fn at(cell: Cell<'_>, line: usize, boundary: usize) -> Self {
        Self {
            column: cell.column(line),
            spaces_before: boundary.saturating_sub(cell.start),
            width: cell.width,
        }
    }

    fn line_end(line: usize, text: &str) -> Self {
        Self {
            column: Column::end_of(line, text),
            spaces_before: 0,
            width: 0,
        }
    }

    /// Spaces of this character at or after the boundary.
    pub fn spaces_after(&self) -> usize {
        self.width - self.spaces_before
    }

    pub fn is_partial(&self) -> bool {
        self.spaces_before > 0
    }
}

/// Covered part of one line of a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapColumnSpan {
    pub start: OverlapColumn,
    pub end: OverlapColumn,
    text: String,
}

impl OverlapColumnSpan {
    pub fn line(&self) -> usize {
        self.start.column.line
    }

    /// Covered text with partially covered characters rendered as spaces.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte range of every character touched by the block, partial ones included.
    pub fn byte_range(&self, line_text: &str) -> std::ops::Range<usize> {
        let end = if self.end.is_partial() {
            column::cells(line_text, 1)
                .find(|c| c.byte == self.end.column.byte)
                .map_or(self.end.column.byte, |c| c.byte + c.text.len())
        } else {
            self.end.column.byte
        };
        self.start.column.byte..end
    }
}

impl fmt::Display for OverlapColumnSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub struct OverlapSpans<'a, L: LineSource + ?Sized> {
    lines: &'a L,
    next_line: usize,
    end_line: usize,
    left: usize,
    right: usize,
    tab_stop: usize,
}

impl<L: LineSource + ?Sized> OverlapSpans<'_, L> {
    fn span_for(&self, line: usize, text: &str) -> OverlapColumnSpan {
        let (left, right) = (self.left, self.right);
        let mut start = None;
        let mut end = None;
        let mut out = String::new();
        for cell in column::cells(text, self.tab_stop) {
            if cell.start >= right {
                end = Some(OverlapColumn::at(cell, line, right));
                break;
            }
            if cell.width == 0 {
                // Orphan zero-width cluster (line start); included when inside the block.
                if cell.start >= left {
                    start.get_or_insert(OverlapColumn::at(cell, line, left));
                    out.push_str(cell.text);
                }
                continue;
            }
            if cell.end() <= left {
                continue;
            }
            start.get_or_insert(OverlapColumn::at(cell, line, left));
            let covered = cell.end().min(right) - cell.start.max(left);
            if covered == cell.width {
                out.push_str(cell.text);
            } else {
                out.extend(std::iter::repeat_n(' ', covered));
            }
            if cell.end() > right {
                end = Some(OverlapColumn::at(cell, line, right));
                break;
            }
        }
        let line_end = OverlapColumn::line_end(line, text);
        OverlapColumnSpan {
            start: start.unwrap_or(line_end),
            end: end.unwrap_or(line_end),
            text: out,
        }
    }
}

impl<L: LineSource + ?Sized> Iterator for OverlapSpans<'_, L> {
    type Item = OverlapColumnSpan;

    fn next(&mut self) -> Option<OverlapColumnSpan> {
        if self.next_line >= self.end_line {
            return None;
        }
        let line = self.next_line;
        self.next_line += 1;
        let text = self.lines.line_text(line).unwrap_or_default();
        Some(self.span_for(line, &text))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end_line.saturating_sub(self.next_line);
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered<L: LineSource + ?Sized>(span: &BlockSpan, lines: &L) -> Vec<String> {
        span.overlap_spans(lines).map(|s| s.to_string()).collect()
    }

    #[test]
    fn before_spaces_expands_leading_tab() {
        let lines = ["\tcat dog"];
        let span = BlockSpan::new(Column::from_number(0, lines[0], 1), 4, 2, 1);
        assert_eq!(span.before_spaces(&lines), 4);
    }

    #[test]
    fn overlap_with_partial_tab() {
        let lines = ["trucker", "\tdog"];
        let span = BlockSpan::new(Column::new(0, 2, 2), 4, 3, 2);
        assert_eq!(rendered(&span, &lines), vec!["uck", "  d"]);
        let spans: Vec<_> = span.overlap_spans(&lines).collect();
        assert_eq!(spans[1].start.column, Column::new(1, 0, 0));
        assert_eq!(spans[1].start.spaces_before, 2);
        assert_eq!(spans[1].end.column, Column::new(1, 2, 2));
        assert_eq!(spans[1].byte_range(lines[1]), 0..2);
    }

    #[test]
    fn short_lines_contribute_empty_spans() {
        let lines = ["abcdef", "ab", ""];
        let span = BlockSpan::new(Column::new(0, 3, 3), 8, 2, 3);
        let spans: Vec<_> = span.overlap_spans(&lines).collect();
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text(), "de");
        assert!(spans[1].is_empty());
        assert_eq!(spans[1].start.column, Column::new(1, 2, 2));
        assert!(spans[2].is_empty());
        assert_eq!(spans[2].start.column, Column::start_of(2));
    }

    #[test]
    fn partial_line_clips_at_end() {
        let lines = ["abcdef", "abcd"];
        let span = BlockSpan::new(Column::new(0, 2, 2), 8, 4, 2);
        assert_eq!(rendered(&span, &lines), vec!["cdef", "cd"]);
    }

    #[test]
    fn wide_character_split_by_right_edge() {
        let lines = ["abcd", "a界b"];
        let span = BlockSpan::new(Column::new(0, 0, 0), 8, 2, 2);
        assert_eq!(rendered(&span, &lines), vec!["ab", "a "]);
        assert_eq!(span.end(&lines), Column::new(1, 2, 4));
    }

    #[test]
    fn combining_marks_stay_with_base() {
        let lines = ["xe\u{0301}y"];
        let span = BlockSpan::new(Column::new(0, 1, 1), 8, 1, 1);
        assert_eq!(rendered(&span, &lines), vec!["e\u{0301}"]);
        assert_eq!(span.end(&lines), Column::new(0, 3, 4));
    }

    #[test]
    fn end_after_partially_covered_tab() {
        let lines = ["abcdefgh", "ab\tx"];
        // right edge at space 3, inside the tab spanning 2..4 on line 1
        let span = BlockSpan::new(Column::new(0, 1, 1), 4, 2, 2);
        assert_eq!(span.end(&lines), Column::new(1, 3, 3));
    }

    #[test]
    fn height_past_buffer_end_is_clipped() {
        let lines = ["abc", "def"];
        let span = BlockSpan::new(Column::new(1, 1, 1), 8, 1, 5);
        assert_eq!(span.last_line(), 5);
        assert_eq!(rendered(&span, &lines), vec!["e"]);
        assert_eq!(span.end(&lines), Column::new(1, 2, 2));
    }

    #[test]
    fn from_spaces_anchors_on_tab() {
        let lines = ["\tdog"];
        let span = BlockSpan::from_spaces(&lines, 0, 2, 3, 1, 4);
        assert_eq!(span.start(), Column::new(0, 0, 0));
        assert_eq!(span.before_spaces(&lines), 0);
    }

    #[test]
    fn equality_covers_all_fields() {
        let a = BlockSpan::new(Column::new(0, 1, 1), 4, 2, 1);
        assert_eq!(a, BlockSpan::new(Column::new(0, 1, 1), 4, 2, 1));
        assert_ne!(a, BlockSpan::new(Column::new(0, 1, 1), 8, 2, 1));
        assert_ne!(a, BlockSpan::new(Column::new(0, 1, 1), 4, 3, 1));
        assert_ne!(a, BlockSpan::new(Column::new(0, 1, 1), 4, 2, 2));
    }

    #[test]
    fn unbounded_width_runs_to_line_end() {
        let lines = ["abc", "\tx"];
        let span = BlockSpan::new(Column::new(0, 1, 1), 4, usize::MAX, 2);
        assert_eq!(span.end(&lines), Column::end_of(1, lines[1]));
        assert_eq!(rendered(&span, &lines), vec!["bc", "   x"]);
    }

    #[test]
    fn unbounded_height_saturates() {
        let lines = ["abc", "def"];
        let span = BlockSpan::new(Column::new(1, 0, 0), 8, usize::MAX, usize::MAX);
        assert_eq!(span.last_line(), usize::MAX);
        assert_eq!(span.end(&lines), Column::end_of(1, lines[1]));
        assert_eq!(rendered(&span, &lines), vec!["def"]);
    }

    #[test]
    #[should_panic(expected = "height")]
    fn zero_height_panics() {
        BlockSpan::new(Column::start_of(0), 4, 1, 0);
    }

    #[test]
    #[should_panic(expected = "tab stop")]
    fn zero_tab_stop_panics() {
        BlockSpan::new(Column::start_of(0), 0, 1, 1);
    }
}
