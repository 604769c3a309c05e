// SPDX-License-Identifier: MIT
//! Focus navigator — which pane `CTRL-W h/j/k/l` lands on.
//!
//! The search is purely geometric: it scans a snapshot of pane placements
//! for one whose facing edge touches the current pane's edge in the given
//! direction and whose cross-axis span overlaps it. Rectangles tile the
//! canvas exactly, so "touches" means the edges coincide.
//!
//! When several panes qualify (moving down from a wide pane onto two
//! narrower ones), the one best aligned with the current pane wins: the
//! smallest distance between cross-axis starts, then the smallest start,
//! then the smallest pane id. The result never depends on scan order.

use std::fmt;

use crate::geometry::Rect;
use crate::registry::Placement;

/// A focus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Above,
    Below,
    Left,
    Right,
}

impl Direction {
    /// The direction back.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Above => Self::Below,
            Self::Below => Self::Above,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Parse a Vim window-motion key (`h`, `j`, `k`, `l`).
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        match key {
            'h' => Some(Self::Left),
            'j' => Some(Self::Below),
            'k' => Some(Self::Above),
            'l' => Some(Self::Right),
            _ => None,
        }
    }

    /// Distance from `from`'s edge to `to`'s facing edge, and the two
    /// cross-axis spans as `(start, end)`.
    const fn measure(self, from: Rect, to: Rect) -> (i32, (i32, i32), (i32, i32)) {
        let horizontal = ((from.x, from.right()), (to.x, to.right()));
        let vertical = ((from.y, from.bottom()), (to.y, to.bottom()));
        match self {
            Self::Below => (to.y - from.bottom(), horizontal.0, horizontal.1),
            Self::Above => (from.y - to.bottom(), horizontal.0, horizontal.1),
            Self::Right => (to.x - from.right(), vertical.0, vertical.1),
            Self::Left => (from.x - to.right(), vertical.0, vertical.1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// True if `to` sits directly next to `from` in `dir`.
#[must_use]
pub const fn is_adjacent(from: Rect, to: Rect, dir: Direction) -> bool {
    let (gap, (fs, fe), (ts, te)) = dir.measure(from, to);
    let touching = gap >= 0 && gap < 1;
    let overlapping = (ts <= fs && fs < te) || (fs <= ts && ts < fe);
    touching && overlapping
}

/// The neighbor of `from` in `dir` among `candidates`, ignoring `from`
/// itself. Candidates are compared on alignment, so the scan order of
/// `candidates` does not matter.
#[must_use]
pub fn neighbor(from: &Placement, dir: Direction, candidates: &[Placement]) -> Option<Placement> {
    candidates
        .iter()
        .filter(|c| c.pane != from.pane && is_adjacent(from.rect, c.rect, dir))
        .min_by_key(|c| {
            let (_, (start, _), (cross, _)) = dir.measure(from.rect, c.rect);
            ((cross - start).unsigned_abs(), cross, c.pane)
        })
        .copied()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
