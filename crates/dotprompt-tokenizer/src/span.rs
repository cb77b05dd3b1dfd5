//! Byte ranges into a dotprompt source.

use std::fmt;
use std::ops::Range;

/// Half-open byte range `start..end` of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    #[inline]
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span {start}..{end} runs backwards");
        Self { start, end }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Zero-width spans mark missing nodes and the end of input.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside. A zero-width span contains nothing.
    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        (self.start..self.end).contains(&offset)
    }

    /// The covered text of `source`.
    #[inline]
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range()]
    }

    /// As a `usize` range, the form ariadne labels take.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_and_range() {
        let source = "Hi {{who}}!";
        let span = Span::new(5, 8);
        assert_eq!(span.slice(source), "who");
        assert_eq!(span.range(), 5..8);
        assert_eq!(span.to_string(), "5..8");
    }

    #[test]
    fn test_zero_width_contains_nothing() {
        let missing = Span::new(4, 4);
        assert!(missing.is_empty());
        assert!(!missing.contains(4));
        assert!(Span::new(3, 5).contains(4));
        assert!(!Span::new(3, 5).contains(5));
    }
}
