//! Source locations

use serde::Serialize;
use std::ops::Range;

/// Byte range into the source plus the 1-based line the range starts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    /// Zero-width span at `offset`
    pub fn point(offset: usize, line: usize) -> Self {
        Self::new(offset, offset, line)
    }

    /// Smallest span covering both; the line is that of whichever starts first
    pub fn to(self, other: Span) -> Span {
        let (first, _) = if self.start <= other.start { (self, other) } else { (other, self) };
        Span::new(first.start, self.end.max(other.end), first.line)
    }

    /// Non-empty range clamped to a source of `len` bytes, for labels
    pub fn label_range(self, len: usize) -> Range<usize> {
        let end = self.end.max(self.start + 1).min(len.max(self.start + 1));
        self.start..end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}..{}", self.line, self.start, self.end)
    }
}

/// A node paired with where it came from
#[derive(Debug, Clone, Serialize)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}
