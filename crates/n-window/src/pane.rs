// SPDX-License-Identifier: MIT
//! Pane — one leaf viewport onto a document.
//!
//! A pane owns its cursor, its pixel scroll offsets and everything derived
//! from them (visible line range, gutter width, paint plan). It shares its
//! [`Document`] with every other pane showing the same text and owns the
//! [`Surface`] that displays it plus the [`ScrollAnimator`] that moves it.
//!
//! The pane layout within its rectangle:
//!
//! ```text
//! ┌──────┬────────────────────────┐
//! │gutter│      text area         │
//! │  12  │ fn main() {            │
//! │  13  │     let x = 1;█        │ ← cursor line
//! │  14  │ }                      │
//! └──────┴────────────────────────┘
//! ```
//!
//! # Threads
//!
//! Every method here runs on the thread that owns the workspace. Animator
//! and row-jump threads only ever publish [`Update`]s; the workspace applies
//! them through [`apply_scroll`](Pane::apply_scroll),
//! [`settled`](Pane::settled) and [`land_jump`](Pane::land_jump).

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::debug;
use parking_lot::Mutex;

use crate::animator::{AnimatorConfig, Completion, ScrollAnimator, ScrollHandle, ScrollRequest};
use crate::cursor::Cursor;
use crate::document::Document;
use crate::geometry::Rect;
use crate::options::Options;
use crate::position::Position;
use crate::surface::Surface;
use crate::tree::NodeId;
use crate::update::{Update, UpdateQueue};

/// Rows of breathing room kept above the cursor by [`Pane::cursor_scroll`].
const TOP_PAD_ROWS: i32 = 1;
/// Rows kept below it.
const BOTTOM_PAD_ROWS: i32 = 2;

// ---------------------------------------------------------------------------
// PaneId
// ---------------------------------------------------------------------------

/// Identifier of a pane. Unique within a workspace, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaneId(usize);

impl PaneId {
    #[inline]
    #[must_use]
    pub const fn from_raw(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Gutter and paint plan
// ---------------------------------------------------------------------------

/// Number of decimal digits in `n` (at least 1).
#[must_use]
pub const fn digits(n: usize) -> u32 {
    if n == 0 { 1 } else { n.ilog10() + 1 }
}

/// Pixel width of the line-number gutter: the widest number plus
/// `padding` on each side, or 0 when numbers are off.
#[must_use]
pub fn gutter_width(line_count: usize, char_width: i32, padding: i32, show_numbers: bool) -> i32 {
    if !show_numbers {
        return 0;
    }
    // Safe: at most 20 digits.
    #[allow(clippy::cast_possible_wrap)]
    let digits = digits(line_count.max(1)) as i32;
    digits * char_width + 2 * padding
}

/// One gutter entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintLine {
    pub row: usize,
    /// Baseline offset from the pane's top edge.
    pub y: i32,
    /// Left edge of the right-aligned number.
    pub x: i32,
    /// The number to draw, `None` when numbers are off.
    pub number: Option<usize>,
}

/// What the rendering layer needs to paint a pane's gutter and cursor line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintPlan {
    pub start: usize,
    pub end: usize,
    pub gutter_width: i32,
    pub lines: Vec<PaintLine>,
    /// Top of the cursor line relative to the pane's top edge, `None` when
    /// the cursor row is scrolled out of view.
    pub cursor_line_y: Option<i32>,
}

// ---------------------------------------------------------------------------
// Pane
// ---------------------------------------------------------------------------

/// A leaf viewport.
pub struct Pane {
    id: PaneId,
    node: NodeId,
    rect: Rect,
    cursor: Cursor,
    scroll_x: i32,
    scroll_y: i32,
    start: usize,
    end: usize,
    gutter_width: i32,
    active: bool,
    document: Arc<dyn Document>,
    surface: Box<dyn Surface>,
    animator: ScrollAnimator,
    queue: Arc<UpdateQueue>,
    /// Held while a row jump is in flight.
    jumping: Arc<Mutex<bool>>,
}

impl fmt::Debug for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pane")
            .field("id", &self.id)
            .field("node", &self.node)
            .field("rect", &self.rect)
            .field("cursor", &self.cursor)
            .field("scroll", &(self.scroll_x, self.scroll_y))
            .field("visible", &(self.start, self.end))
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl Pane {
    /// A pane at the top of `document` with its own animator thread.
    #[must_use]
    pub fn new(
        id: PaneId,
        node: NodeId,
        document: Arc<dyn Document>,
        surface: Box<dyn Surface>,
        queue: Arc<UpdateQueue>,
        options: &Options,
    ) -> Self {
        let config = AnimatorConfig {
            tick: options.tick(),
            ..AnimatorConfig::default()
        };
        let animator = ScrollAnimator::spawn(id, Arc::clone(&queue), config);
        let mut pane = Self {
            id,
            node,
            rect: Rect::ZERO,
            cursor: Cursor::new(),
            scroll_x: 0,
            scroll_y: 0,
            start: 0,
            end: 0,
            gutter_width: 0,
            active: false,
            document,
            surface,
            animator,
            queue,
            jumping: Arc::new(Mutex::new(false)),
        };
        pane.update(options);
        pane
    }

    /// A new pane showing the same document at the same cursor and scroll
    /// position, as `:split` creates.
    #[must_use]
    pub fn fork(&self, id: PaneId, node: NodeId, mut surface: Box<dyn Surface>, options: &Options) -> Self {
        surface.scroll_by(self.scroll_x, self.scroll_y);
        let mut pane = Self::new(
            id,
            node,
            Arc::clone(&self.document),
            surface,
            Arc::clone(&self.queue),
            options,
        );
        pane.cursor = self.cursor;
        pane.scroll_x = self.scroll_x;
        pane.scroll_y = self.scroll_y;
        pane.update(options);
        pane
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn id(&self) -> PaneId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    pub const fn set_node(&mut self, node: NodeId) {
        self.node = node;
    }

    #[inline]
    #[must_use]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Pixel scroll offsets `(x, y)`.
    #[inline]
    #[must_use]
    pub const fn scroll_offset(&self) -> (i32, i32) {
        (self.scroll_x, self.scroll_y)
    }

    /// Visible lines as `start..end`.
    #[inline]
    #[must_use]
    pub const fn visible_range(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    #[inline]
    #[must_use]
    pub const fn gutter_width(&self) -> i32 {
        self.gutter_width
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    /// A handle other threads can use to scroll this pane.
    #[must_use]
    pub fn scroll_handle(&self) -> ScrollHandle {
        self.animator.handle()
    }

    /// True while a row jump is in flight.
    #[must_use]
    pub fn is_jumping(&self) -> bool {
        *self.jumping.lock()
    }

    /// Where the scroll offsets will be once every submitted animation has
    /// been applied.
    #[must_use]
    pub fn heading(&self) -> (i32, i32) {
        let (px, py) = self.animator.pending();
        (self.scroll_x.saturating_add(px), self.scroll_y.saturating_add(py))
    }

    /// Width of the text area (pane width minus gutter).
    #[must_use]
    pub const fn text_area_width(&self) -> i32 {
        self.rect.width - self.gutter_width
    }

    // -- Derived state ------------------------------------------------------

    /// Recompute the visible range and gutter from the scroll offset.
    pub fn update(&mut self, options: &Options) {
        let metrics = self.document.metrics();
        let line_height = metrics.line_height.max(1);
        let line_count = self.document.line_count();
        self.start = to_row(self.scroll_y / line_height);
        self.end = (self.start + to_row(self.rect.height / line_height) + 1).min(line_count);
        self.gutter_width = gutter_width(
            line_count,
            metrics.char_width,
            options.gutter_padding,
            options.number,
        );
    }

    /// Take a new rectangle from the layout.
    pub fn set_rect(&mut self, rect: Rect, options: &Options) {
        self.rect = rect;
        self.surface.set_geometry(rect);
        self.update(options);
    }

    /// Pixel position of `pos` in document space (before scrolling).
    #[must_use]
    pub fn pixel_of(&self, pos: Position) -> (i32, i32) {
        let metrics = self.document.metrics();
        let x = self.document.text_width(pos.row, pos.col);
        let y = to_px(pos.row).saturating_mul(metrics.line_height);
        (x, y)
    }

    /// The cursor relative to the pane's visible origin, gutter included.
    #[must_use]
    pub fn cursor_screen_pos(&self) -> (i32, i32) {
        let (x, y) = self.pixel_of(self.cursor.pos());
        (self.gutter_width + x - self.scroll_x, y - self.scroll_y)
    }

    /// The scroll needed to bring `pos` inside the padded text area.
    ///
    /// Horizontally the cursor keeps `sidescrolloff` columns of room on the
    /// left and the same plus one column on the right; vertically it keeps
    /// one row above and two below. Visible scrollbars shrink the area.
    /// On a pane too small for its padding the window collapses to the
    /// top-left corner of the padded area instead of turning inside out.
    /// The delta is measured from the [`heading`](Self::heading) and never
    /// scrolls before the document's origin.
    #[must_use]
    pub fn cursor_scroll(&self, pos: Position, options: &Options) -> (i32, i32) {
        let metrics = self.document.metrics();
        let bars = self.surface.scrollbar_sizes();
        let (px, py) = self.pixel_of(pos);
        let (sx, sy) = self.heading();

        let padding = to_px(options.side_scroll_off).saturating_mul(metrics.char_width);
        let left = sx + padding;
        let right = sx + self.text_area_width() - padding - metrics.char_width - bars.vertical_width;
        let right = right.max(left);
        let dx = overshoot(px, left, right).max(-sx);

        let top = sy + TOP_PAD_ROWS * metrics.line_height;
        let bottom = sy + self.rect.height - BOTTOM_PAD_ROWS * metrics.line_height - bars.horizontal_height;
        let bottom = bottom.max(top);
        let dy = overshoot(py, top, bottom).max(-sy);

        (dx, dy)
    }

    // -- Scrolling ----------------------------------------------------------

    /// Bring the cursor back into view.
    ///
    /// With `smoothscroll` the delta is handed to the animator; otherwise it
    /// is applied at once.
    pub fn scroll_to_cursor(&mut self, options: &Options) -> Completion {
        let (dx, dy) = self.cursor_scroll(self.cursor.pos(), options);
        if dx == 0 && dy == 0 {
            return Completion::fired();
        }
        if options.smooth_scroll {
            return self.animator.submit(ScrollRequest::new(dx, dy));
        }
        self.scroll_by(dx, dy, options);
        self.settled();
        Completion::fired()
    }

    /// Scroll by `rows` lines.
    ///
    /// The displacement is clamped so the first line never scrolls below
    /// the top and the last line never above it. The cursor follows by the
    /// same number of rows (keeping its sticky column) when `jump` is set or
    /// when staying put would leave it within `scrolloff` rows of the new
    /// visible edges.
    ///
    /// With `smoothscroll` the animation runs on a short-lived jump thread,
    /// whose handle is returned; the cursor lands via
    /// [`Update::JumpLanded`] once the animation completes. A jump requested
    /// while another one is in flight is dropped.
    pub fn scroll_rows(&mut self, rows: isize, jump: bool, options: &Options) -> Option<JoinHandle<()>> {
        let metrics = self.document.metrics();
        let line_height = metrics.line_height.max(1);
        let max_y = to_px(self.document.line_count().saturating_sub(1)).saturating_mul(line_height);
        let (_, from) = self.heading();
        let wanted = from.saturating_add(to_px_signed(rows).saturating_mul(line_height));
        let dy = wanted.clamp(0, max_y.max(from)) - from;

        let target = self.cursor.target(rows, 0, self.document.as_ref(), false);
        let jump = jump || self.leaves_margin(from + dy, options.scroll_off);
        if dy == 0 && (!jump || target == self.cursor.pos()) {
            return None;
        }

        if !options.smooth_scroll {
            self.scroll_by(0, dy, options);
            if jump {
                self.land_jump(target);
            }
            self.settled();
            return None;
        }

        {
            let mut jumping = self.jumping.lock();
            if *jumping {
                debug!("pane {}: row jump already in flight, dropped", self.id);
                return None;
            }
            *jumping = true;
        }

        let pane = self.id;
        let queue = Arc::clone(&self.queue);
        let jumping = Arc::clone(&self.jumping);
        debug!("pane {pane}: scroll {rows} rows ({dy}px), jump={jump}");
        let done = self.animator.submit(ScrollRequest::new(0, dy));
        let handle = thread::Builder::new()
            .name(format!("jump-{pane}"))
            .spawn(move || {
                done.wait();
                if jump {
                    queue.publish(Update::JumpLanded { pane, pos: target });
                }
                *jumping.lock() = false;
            })
            .expect("failed to spawn row jump thread");
        Some(handle)
    }

    /// True if, with the view's top edge at pixel `top`, the cursor row
    /// would sit within `margin` rows of the visible edges.
    fn leaves_margin(&self, top: i32, margin: usize) -> bool {
        let line_height = self.document.metrics().line_height.max(1);
        let start = to_row(top / line_height);
        let end = (start + to_row(self.rect.height / line_height) + 1).min(self.document.line_count());
        let row = self.cursor.row();
        row < start.saturating_add(margin) || row.saturating_add(margin) > end
    }

    /// Relative cursor move.
    ///
    /// `cols == 0` moves vertically toward the sticky column. The target is
    /// clamped to the document; an unchanged target does nothing and
    /// returns `None`. With `sticky` the landed column is remembered. The
    /// cursor moves at once; the scroll that keeps it visible is handed to
    /// the animator and its completion returned.
    pub fn cursor_to(&mut self, rows: isize, cols: isize, sticky: bool, options: &Options) -> Option<Completion> {
        let target = self.cursor.target(rows, cols, self.document.as_ref(), true);
        if target == self.cursor.pos() {
            return None;
        }
        self.cursor.place(target, sticky);
        self.cursor_moved();
        Some(self.scroll_to_cursor(options))
    }

    /// Absolute cursor placement. Scrolls with animation only when `jump`
    /// is set; otherwise the view snaps.
    pub fn scroll_to(&mut self, pos: Position, jump: bool, options: &Options) -> Option<Completion> {
        let mut cursor = Cursor::at(pos);
        cursor.clamp(self.document.as_ref(), true);
        if cursor.pos() == self.cursor.pos() {
            return None;
        }
        self.cursor = cursor;
        self.cursor_moved();
        if jump {
            return Some(self.scroll_to_cursor(options));
        }
        let (dx, dy) = self.cursor_scroll(self.cursor.pos(), options);
        if dx != 0 || dy != 0 {
            self.scroll_by(dx, dy, options);
            self.settled();
        }
        Some(Completion::fired())
    }

    fn cursor_moved(&mut self) {
        let pos = self.cursor.pos();
        self.document.move_cursor(pos);
        let (x, y) = self.cursor_screen_pos();
        self.surface.place_cursor(x, y);
        self.queue.publish(Update::CursorMoved { pane: self.id, pos });
    }

    // -- Applying updates ---------------------------------------------------

    /// Apply one published animation frame.
    pub fn apply_scroll(&mut self, dx: i32, dy: i32, options: &Options) {
        self.animator.applied(dx, dy);
        self.scroll_by(dx, dy, options);
    }

    /// Shift the scroll offsets at once and mirror it on the surface.
    /// Offsets never go negative.
    pub fn scroll_by(&mut self, dx: i32, dy: i32, options: &Options) {
        let x = self.scroll_x.saturating_add(dx).max(0);
        let y = self.scroll_y.saturating_add(dy).max(0);
        let (dx, dy) = (x - self.scroll_x, y - self.scroll_y);
        self.scroll_x = x;
        self.scroll_y = y;
        self.surface.scroll_by(dx, dy);
        self.update(options);
        if self.active {
            let (cx, cy) = self.cursor_screen_pos();
            self.surface.place_cursor(cx, cy);
        }
    }

    /// An animation finished: tell the document what is visible now.
    pub fn settled(&mut self) {
        self.document.visible_range_changed(self.start, self.end);
        self.surface.request_paint();
    }

    /// Land a finished row jump.
    pub fn land_jump(&mut self, pos: Position) {
        let mut cursor = Cursor::at(pos);
        cursor.clamp(self.document.as_ref(), false);
        self.cursor.place(cursor.pos(), false);
        self.document.move_cursor(self.cursor.pos());
        let (x, y) = self.cursor_screen_pos();
        self.surface.place_cursor(x, y);
    }

    /// Adopt the surface's scrollbar values after it scrolled on its own
    /// (a dragged scrollbar, a mouse wheel).
    pub fn sync_scroll_from_surface(&mut self, options: &Options) {
        let (x, y) = self.surface.scroll_position();
        if (x, y) == (self.scroll_x, self.scroll_y) {
            return;
        }
        self.scroll_x = x.max(0);
        self.scroll_y = y.max(0);
        self.update(options);
        self.settled();
    }

    // -- Focus and lifecycle ------------------------------------------------

    /// Become the active pane.
    pub fn activate(&mut self) {
        self.active = true;
        self.surface.focus();
        let (x, y) = self.cursor_screen_pos();
        self.surface.place_cursor(x, y);
        self.document.move_cursor(self.cursor.pos());
    }

    pub const fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn request_paint(&mut self) {
        self.surface.request_paint();
    }

    /// Hide the surface and stop the animator. Any animation in flight is
    /// settled first.
    pub fn shutdown(&mut self) {
        self.active = false;
        self.animator.stop();
        self.surface.hide();
    }

    // -- Painting -----------------------------------------------------------

    /// Gutter and cursor-line layout for the current scroll position.
    #[must_use]
    pub fn paint_plan(&self, options: &Options) -> PaintPlan {
        let metrics = self.document.metrics();
        let row = self.cursor.row();
        let start_px = to_px(self.start).saturating_mul(metrics.line_height);
        let shift = metrics.baseline_shift - (self.scroll_y - start_px);
        let widest = to_px(digits(self.document.line_count().max(1)) as usize);

        let lines = (self.start..self.end)
            .map(|i| {
                let number = options.number.then(|| {
                    if options.relative_number && i != row { i.abs_diff(row) } else { i + 1 }
                });
                let width = number.map_or(0, |n| to_px(digits(n) as usize));
                PaintLine {
                    row: i,
                    y: to_px(i - self.start).saturating_mul(metrics.line_height) + shift,
                    x: options.gutter_padding + (widest - width) * metrics.char_width,
                    number,
                }
            })
            .collect();

        let cursor_line_y = (self.start..self.end)
            .contains(&row)
            .then(|| to_px(row).saturating_mul(metrics.line_height) - self.scroll_y);

        PaintPlan {
            start: self.start,
            end: self.end,
            gutter_width: self.gutter_width,
            lines,
            cursor_line_y,
        }
    }
}

/// How far `p` lies outside `lo..=hi`, signed toward the side it left.
const fn overshoot(p: i32, lo: i32, hi: i32) -> i32 {
    if p < lo {
        p - lo
    } else if p > hi {
        p - hi
    } else {
        0
    }
}

fn to_row(px: i32) -> usize {
    usize::try_from(px).unwrap_or(0)
}

fn to_px(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn to_px_signed(n: isize) -> i32 {
    i32::try_from(n).unwrap_or(if n < 0 { i32::MIN } else { i32::MAX })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
