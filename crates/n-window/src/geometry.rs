// SPDX-License-Identifier: MIT
//! Geometry — pixel rectangles, split orientation, and extent distribution.
//!
//! Everything here is pure. The split tree calls into this module to turn
//! "how many leaves does this subtree produce along an axis" into concrete
//! pixel extents, and the focus navigator uses [`Rect`] edges for adjacency.
//!
//! # Orientation vs. axis
//!
//! A **vertical** split places its children side by side (`:vsplit`), so it
//! partitions *width*. A **horizontal** split stacks its children top to
//! bottom (`:split`), so it partitions *height*:
//!
//! ```text
//! Vertical             Horizontal
//! ┌─────┬─────┐        ┌───────────┐
//! │  a  │  b  │        │     a     │
//! │     │     │        ├───────────┤
//! └─────┴─────┘        │     b     │
//!                      └───────────┘
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// A rectangle in canvas pixels: origin `(x, y)` and `width × height`.
///
/// Edges are half-open: a rect covers `x..x + width` horizontally and
/// `y..y + height` vertically, so two rects sharing an edge do not overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// The empty rect at the origin.
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the rightmost column.
    #[inline]
    #[must_use]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// One past the bottom row.
    #[inline]
    #[must_use]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// True if the point lies inside the rect (half-open on both axes).
    #[inline]
    #[must_use]
    pub const fn contains(self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// True if the two rects share any area.
    #[inline]
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Area in square pixels, widened so large canvases cannot overflow.
    #[inline]
    #[must_use]
    pub const fn area(self) -> i64 {
        self.width as i64 * self.height as i64
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// How an internal node arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Children stacked top to bottom; the split axis is height.
    Horizontal,
    /// Children side by side, left to right; the split axis is width.
    Vertical,
}

impl Orientation {
    /// Map the `vertical` flag used by the `:split`/`:vsplit` commands.
    #[inline]
    #[must_use]
    pub const fn from_vertical(vertical: bool) -> Self {
        if vertical { Self::Vertical } else { Self::Horizontal }
    }

    #[inline]
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Vertical)
    }

    /// Extent of `rect` along this orientation's split axis.
    #[inline]
    #[must_use]
    pub const fn extent(self, rect: Rect) -> i32 {
        match self {
            Self::Vertical => rect.width,
            Self::Horizontal => rect.height,
        }
    }

    /// Overwrite the extent of `rect` along this orientation's split axis.
    #[inline]
    pub const fn set_extent(self, rect: &mut Rect, extent: i32) {
        match self {
            Self::Vertical => rect.width = extent,
            Self::Horizontal => rect.height = extent,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal => f.write_str("horizontal"),
            Self::Vertical => f.write_str("vertical"),
        }
    }
}

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Split `extent` into shares proportional to `weights`.
///
/// Shares are computed from cumulative boundaries,
/// `floor(extent × Σw[..=i] / Σw) − floor(extent × Σw[..i] / Σw)`, so they
/// always sum to exactly `extent`. When `extent` is a multiple of the total
/// weight every share is exact and no child absorbs a remainder.
///
/// Negative extents are treated as zero. An all-zero weight list yields
/// all-zero shares.
#[must_use]
pub fn distribute(extent: i32, weights: &[usize]) -> Vec<i32> {
    let extent = i64::from(extent.max(0));
    let total: u64 = weights.iter().map(|&w| w as u64).sum();
    if total == 0 {
        return vec![0; weights.len()];
    }
    #[allow(clippy::cast_possible_wrap)]
    let total = total as i64;

    let mut shares = Vec::with_capacity(weights.len());
    let mut cumulative: i64 = 0;
    let mut boundary: i64 = 0;
    for &w in weights {
        #[allow(clippy::cast_possible_wrap)]
        {
            cumulative += w as i64;
        }
        let next = extent * cumulative / total;
        // Safe: every share is bounded by `extent`, which came from an i32.
        #[allow(clippy::cast_possible_truncation)]
        shares.push((next - boundary) as i32);
        boundary = next;
    }
    shares
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ── Rect ─────────────────────────────────────────────────────────────

    #[test]
    fn rect_edges() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
        assert_eq!(r.area(), 1200);
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(0, 0, 100, 50);
        assert!(r.contains(0, 0));
        assert!(r.contains(99, 49));
        assert!(!r.contains(100, 0));
        assert!(!r.contains(0, 50));
    }

    #[test]
    fn adjacent_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(100, 0, 100, 100);
        assert!(!a.intersects(b));
        assert!(a.intersects(Rect::new(99, 99, 10, 10)));
    }

    #[test]
    fn rect_display() {
        assert_eq!(Rect::new(5, 6, 300, 100).to_string(), "300x100+5+6");
    }

    // ── Orientation ──────────────────────────────────────────────────────

    #[test]
    fn vertical_measures_width() {
        let r = Rect::new(0, 0, 300, 100);
        assert_eq!(Orientation::Vertical.extent(r), 300);
        assert_eq!(Orientation::Horizontal.extent(r), 100);
    }

    #[test]
    fn set_extent_touches_one_axis() {
        let mut r = Rect::new(1, 2, 3, 4);
        Orientation::Vertical.set_extent(&mut r, 50);
        assert_eq!(r, Rect::new(1, 2, 50, 4));
        Orientation::Horizontal.set_extent(&mut r, 60);
        assert_eq!(r, Rect::new(1, 2, 50, 60));
    }

    #[test]
    fn from_vertical_flag() {
        assert_eq!(Orientation::from_vertical(true), Orientation::Vertical);
        assert_eq!(Orientation::from_vertical(false), Orientation::Horizontal);
    }

    // ── distribute ───────────────────────────────────────────────────────

    #[test]
    fn distribute_even() {
        assert_eq!(distribute(300, &[1, 1, 1]), vec![100, 100, 100]);
    }

    #[test]
    fn distribute_weighted() {
        assert_eq!(distribute(300, &[1, 2]), vec![100, 200]);
    }

    #[test]
    fn distribute_remainder_lands_late() {
        let shares = distribute(301, &[1, 1, 1]);
        assert_eq!(shares, vec![100, 100, 101]);
        assert_eq!(shares.iter().sum::<i32>(), 301);
    }

    #[test]
    fn distribute_degenerate_inputs() {
        assert_eq!(distribute(100, &[]), Vec::<i32>::new());
        assert_eq!(distribute(100, &[0, 0]), vec![0, 0]);
        assert_eq!(distribute(-5, &[1, 1]), vec![0, 0]);
    }

    #[test]
    fn distribute_always_sums_exactly() {
        for extent in 0..200 {
            for weights in [&[1usize][..], &[1, 2, 3], &[3, 1], &[7, 7, 7, 7]] {
                let shares = distribute(extent, weights);
                assert_eq!(shares.iter().sum::<i32>(), extent, "{extent} {weights:?}");
            }
        }
    }
}
