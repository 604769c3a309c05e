// SPDX-License-Identifier: MIT
//! Text positions.
//!
//! All coordinates are **0-indexed**. Row 0 is the first line, column 0 is
//! the first character. Columns count Unicode scalar values (chars), which is
//! how `ropey` indexes text. Pixel positions are a pane concern and never
//! live here.

use std::fmt;

/// A position in a document: (row, column), both 0-indexed.
///
/// Ordered lexicographically, row first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    /// The origin.
    pub const ZERO: Self = Self { row: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.row, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed, like Vim's `line:col` ruler.
        write!(f, "{}:{}", self.row + 1, self.col + 1)
    }
}
