// SPDX-License-Identifier: MIT
//! Document — the text-model collaborator.
//!
//! Panes never own text. They ask a [`Document`] how many lines there are,
//! how long a line is, and how wide a prefix of it renders, and they tell it
//! where the authoritative cursor went and which lines became visible.
//! Several panes may show the same document at once (`:split` clones the
//! handle), so implementations are shared behind an `Arc` and must be
//! `Send + Sync`: notifications arrive from the thread that drains updates.
//!
//! [`RopeDocument`] is the reference implementation: a read-only
//! [`ropey::Rope`] whose widths are measured in display columns (tabs expand
//! to the next tab stop, wide characters take two columns) and scaled by the
//! font's character width.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use ropey::Rope;
use unicode_width::UnicodeWidthChar;

use crate::position::Position;

// ---------------------------------------------------------------------------
// FontMetrics
// ---------------------------------------------------------------------------

/// Pixel metrics of the font a document is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    /// Height of one text line.
    pub line_height: i32,
    /// Advance of one display column.
    pub char_width: i32,
    /// Offset from a line's top to its baseline.
    pub baseline_shift: i32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            line_height: 20,
            char_width: 10,
            baseline_shift: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// Document trait
// ---------------------------------------------------------------------------

/// What a pane needs from the text model.
pub trait Document: Send + Sync {
    /// Number of lines. At least 1 for any loaded document.
    fn line_count(&self) -> usize;

    /// Length of `line` in chars, excluding the line ending. `None` when the
    /// line does not exist (or is not loaded yet).
    fn line_len(&self, line: usize) -> Option<usize>;

    /// Pixel width of the first `col` chars of `line`.
    fn text_width(&self, line: usize, col: usize) -> i32;

    fn metrics(&self) -> FontMetrics;

    /// The authoritative cursor of the active pane moved.
    fn move_cursor(&self, pos: Position);

    /// A pane now shows lines `start..end`.
    fn visible_range_changed(&self, start: usize, end: usize);
}

// ---------------------------------------------------------------------------
// Display columns
// ---------------------------------------------------------------------------

/// Display columns occupied by the first `char_col` chars.
///
/// Tabs expand to the next multiple of `tab_width`, wide characters count
/// twice, and a line ending stops the walk.
#[must_use]
pub fn display_cols<I: Iterator<Item = char>>(chars: I, char_col: usize, tab_width: u8) -> usize {
    let tab = usize::from(tab_width.max(1));
    let mut col = 0;
    for ch in chars.take(char_col) {
        match ch {
            '\n' | '\r' => break,
            '\t' => col = (col / tab + 1) * tab,
            _ => col += ch.width().unwrap_or(0),
        }
    }
    col
}

// ---------------------------------------------------------------------------
// RopeDocument
// ---------------------------------------------------------------------------

/// A read-only rope with the notification state a pane writes back.
#[derive(Debug)]
pub struct RopeDocument {
    rope: Rope,
    path: Option<PathBuf>,
    metrics: FontMetrics,
    tab_width: u8,
    cursor: Mutex<Position>,
    visible: Mutex<Option<(usize, usize)>>,
}

impl RopeDocument {
    /// A document holding `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            path: None,
            metrics: FontMetrics::default(),
            tab_width: 4,
            cursor: Mutex::new(Position::ZERO),
            visible: Mutex::new(None),
        }
    }

    /// Load a document from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn from_file(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut doc = Self::from_text(&text);
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    #[must_use]
    pub const fn with_metrics(mut self, metrics: FontMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The cursor last reported through [`Document::move_cursor`].
    #[must_use]
    pub fn cursor(&self) -> Position {
        *self.cursor.lock()
    }

    /// The range last reported through [`Document::visible_range_changed`].
    #[must_use]
    pub fn visible_range(&self) -> Option<(usize, usize)> {
        *self.visible.lock()
    }
}

impl Document for RopeDocument {
    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn line_len(&self, line: usize) -> Option<usize> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        // Strip `\n`, `\r\n` or a lone `\r`.
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        if len > 0 && slice.char(len - 1) == '\r' {
            len -= 1;
        }
        Some(len)
    }

    fn text_width(&self, line: usize, col: usize) -> i32 {
        if line >= self.rope.len_lines() {
            return 0;
        }
        let cols = display_cols(self.rope.line(line).chars(), col, self.tab_width);
        i32::try_from(cols)
            .unwrap_or(i32::MAX)
            .saturating_mul(self.metrics.char_width)
    }

    fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    fn move_cursor(&self, pos: Position) {
        *self.cursor.lock() = pos;
    }

    fn visible_range_changed(&self, start: usize, end: usize) {
        *self.visible.lock() = Some((start, end));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── display_cols ─────────────────────────────────────────────────────

    #[test]
    fn ascii_is_one_column_per_char() {
        assert_eq!(display_cols("hello".chars(), 3, 4), 3);
        assert_eq!(display_cols("hello".chars(), 99, 4), 5);
    }

    #[test]
    fn tabs_snap_to_stops() {
        // a(0) b(1) tab→4 c(4)
        assert_eq!(display_cols("ab\tc".chars(), 3, 4), 4);
        assert_eq!(display_cols("\t\t".chars(), 2, 8), 16);
    }

    #[test]
    fn wide_chars_take_two() {
        assert_eq!(display_cols("日本x".chars(), 2, 4), 4);
        assert_eq!(display_cols("日本x".chars(), 3, 4), 5);
    }

    #[test]
    fn line_ending_stops_the_walk() {
        assert_eq!(display_cols("ab\ncd".chars(), 5, 4), 2);
    }

    // ── RopeDocument ─────────────────────────────────────────────────────

    #[test]
    fn line_len_excludes_endings() {
        let doc = RopeDocument::from_text("abc\r\nde\nf");
        assert_eq!(doc.line_count(), 3);
        assert_eq!(doc.line_len(0), Some(3));
        assert_eq!(doc.line_len(1), Some(2));
        assert_eq!(doc.line_len(2), Some(1));
        assert_eq!(doc.line_len(3), None);
    }

    #[test]
    fn empty_document_has_one_line() {
        let doc = RopeDocument::from_text("");
        assert_eq!(doc.line_count(), 1);
        assert_eq!(doc.line_len(0), Some(0));
    }

    #[test]
    fn text_width_scales_by_char_width() {
        let doc = RopeDocument::from_text("\tab\n").with_metrics(FontMetrics {
            line_height: 16,
            char_width: 8,
            baseline_shift: 12,
        });
        assert_eq!(doc.text_width(0, 0), 0);
        assert_eq!(doc.text_width(0, 1), 32);
        assert_eq!(doc.text_width(0, 3), 48);
        assert_eq!(doc.text_width(9, 3), 0);
    }

    #[test]
    fn notifications_are_recorded() {
        let doc = RopeDocument::from_text("a\nb\n");
        assert_eq!(doc.visible_range(), None);
        doc.move_cursor(Position::new(1, 0));
        doc.visible_range_changed(0, 2);
        assert_eq!(doc.cursor(), Position::new(1, 0));
        assert_eq!(doc.visible_range(), Some((0, 2)));
    }

    #[test]
    fn from_file_remembers_path() {
        let path = std::env::temp_dir().join(format!("n-window-doc-{}.txt", std::process::id()));
        fs::write(&path, "one\ntwo\n").unwrap();
        let doc = RopeDocument::from_file(&path).unwrap();
        assert_eq!(doc.path(), Some(path.as_path()));
        assert_eq!(doc.line_len(1), Some(3));
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn from_file_missing_is_an_error() {
        assert!(RopeDocument::from_file(Path::new("/definitely/not/here.txt")).is_err());
    }
}
