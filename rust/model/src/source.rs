// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Source ranges linking entities back to the text they were declared in

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in a text buffer (0-indexed line and column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TextPosition {
    pub line: u32,
    pub column: u32,
}

impl TextPosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for TextPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open text range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRange {
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl SourceRange {
    pub fn new(start_line: u32, start_column: u32, end_line: u32, end_column: u32) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Build a range from two positions
    pub fn from_positions(start: TextPosition, end: TextPosition) -> Self {
        Self::new(start.line, start.column, end.line, end.column)
    }

    #[inline]
    pub fn start(&self) -> TextPosition {
        TextPosition::new(self.start_line, self.start_column)
    }

    #[inline]
    pub fn end(&self) -> TextPosition {
        TextPosition::new(self.end_line, self.end_column)
    }

    /// True when start and end coincide (a bare cursor)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start() >= self.end()
    }

    /// Check whether a position lies inside the half-open range
    #[inline]
    pub fn contains(&self, position: TextPosition) -> bool {
        self.start() <= position && position < self.end()
    }

    /// Check whether two half-open ranges share at least one position
    #[inline]
    pub fn overlaps(&self, other: &SourceRange) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }

    /// Check whether `other` lies entirely within this range
    #[inline]
    pub fn encloses(&self, other: &SourceRange) -> bool {
        self.start() <= other.start() && other.end() <= self.end()
    }

    /// Number of lines spanned beyond the first one
    #[inline]
    pub fn line_span(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line)
    }

    /// Column distance between start and end (may be negative on multi-line ranges)
    #[inline]
    pub fn column_span(&self) -> i64 {
        self.end_column as i64 - self.start_column as i64
    }

    /// Ordering key where smaller means more specific
    #[inline]
    pub fn specificity(&self) -> (u32, i64) {
        (self.line_span(), self.column_span())
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start(), self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let range = SourceRange::new(2, 4, 2, 10);
        assert!(range.contains(TextPosition::new(2, 4)));
        assert!(range.contains(TextPosition::new(2, 9)));
        assert!(!range.contains(TextPosition::new(2, 10)));
        assert!(!range.contains(TextPosition::new(1, 5)));
    }

    #[test]
    fn test_multiline_contains() {
        let range = SourceRange::new(1, 8, 4, 1);
        assert!(range.contains(TextPosition::new(2, 0)));
        assert!(range.contains(TextPosition::new(1, 30)));
        assert!(!range.contains(TextPosition::new(4, 1)));
    }

    #[test]
    fn test_overlaps() {
        let a = SourceRange::new(0, 0, 3, 0);
        let b = SourceRange::new(2, 5, 5, 0);
        let c = SourceRange::new(3, 0, 4, 0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_nested_range_is_more_specific() {
        let room = SourceRange::new(0, 0, 6, 1);
        let wall = SourceRange::new(2, 4, 2, 20);
        assert!(room.encloses(&wall));
        assert!(wall.specificity() < room.specificity());
    }

    #[test]
    fn test_json_shape() {
        let range: SourceRange =
            serde_json::from_str(r#"{"startLine":1,"startColumn":2,"endLine":3,"endColumn":4}"#)
                .unwrap();
        assert_eq!(range, SourceRange::new(1, 2, 3, 4));
    }
}
