// SPDX-License-Identifier: MIT
//! Cursor — a pane's position in its document plus the sticky column.
//!
//! # Sticky column
//!
//! When moving vertically, the cursor remembers the column it wanted to be
//! at. Passing through a short line clamps the actual column, but reaching a
//! long line again snaps back to the remembered one. Horizontal placement
//! resets the sticky column unless the caller asks to keep it.
//!
//! # Column limit
//!
//! Target computations take a `past_end: bool` instead of an editing mode:
//! `false` keeps the cursor ON a character (`0..len`), `true` lets it sit
//! after the last one (`0..=len`). Lines the document cannot measure yet
//! clamp to column 0.

use crate::document::Document;
use crate::position::Position;

/// A cursor. Does not reference the document; it is passed to the methods
/// that need to clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pos: Position,
    sticky_col: usize,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pos: Position::ZERO,
            sticky_col: 0,
        }
    }

    /// A cursor at `pos`, remembering its column.
    #[must_use]
    pub const fn at(pos: Position) -> Self {
        Self {
            pos,
            sticky_col: pos.col,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn pos(&self) -> Position {
        self.pos
    }

    #[inline]
    #[must_use]
    pub const fn row(&self) -> usize {
        self.pos.row
    }

    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.pos.col
    }

    /// The column vertical movement tries to return to.
    #[inline]
    #[must_use]
    pub const fn sticky_col(&self) -> usize {
        self.sticky_col
    }

    // -- Placement ----------------------------------------------------------

    /// Move to `pos`. With `sticky`, the landed column becomes the new
    /// sticky column; otherwise the old one is kept.
    pub const fn place(&mut self, pos: Position, sticky: bool) {
        self.pos = pos;
        if sticky {
            self.sticky_col = pos.col;
        }
    }

    /// Pull the cursor back inside the document.
    pub fn clamp(&mut self, doc: &dyn Document, past_end: bool) {
        let row = clamp_row(doc, self.pos.row);
        self.pos = Position::new(row, self.pos.col.min(max_col(doc, row, past_end)));
    }

    // -- Targets ------------------------------------------------------------

    /// Where a relative move of `rows`/`cols` lands.
    ///
    /// The row is clamped to the document. `cols == 0` means a purely
    /// vertical move, which aims for the sticky column; otherwise the column
    /// moves relative to the current one. Either way the column is clamped
    /// to the target line.
    #[must_use]
    pub fn target(&self, rows: isize, cols: isize, doc: &dyn Document, past_end: bool) -> Position {
        let row = clamp_row(doc, self.pos.row.saturating_add_signed(rows));
        let col = if cols == 0 {
            self.sticky_col
        } else {
            self.pos.col.saturating_add_signed(cols)
        };
        Position::new(row, col.min(max_col(doc, row, past_end)))
    }
}

/// Largest valid row.
fn clamp_row(doc: &dyn Document, row: usize) -> usize {
    row.min(doc.line_count().saturating_sub(1))
}

/// Largest valid column on `row`.
#[must_use]
pub fn max_col(doc: &dyn Document, row: usize, past_end: bool) -> usize {
    match doc.line_len(row) {
        Some(len) if past_end => len,
        Some(len) => len.saturating_sub(1),
        None => 0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
