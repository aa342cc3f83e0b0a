use std::ops::Range;

/// How an operator treats the span produced by a motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionKind {
    CharacterExclusive,
    CharacterInclusive,
    LineWise,
}

/// Result handed back by a motion capture: a buffer span plus kind metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionResult {
    /// Byte span in buffer coordinates; always `start <= end`.
    pub span: Range<usize>,
    pub kind: MotionKind,
    pub is_forward: bool,
}

impl MotionResult {
    pub fn new(span: Range<usize>, kind: MotionKind, is_forward: bool) -> Self {
        let span = if span.start <= span.end {
            span
        } else {
            span.end..span.start
        };
        Self {
            span,
            kind,
            is_forward,
        }
    }

    pub fn is_linewise(&self) -> bool {
        self.kind == MotionKind::LineWise
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }
}
