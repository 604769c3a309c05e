// SPDX-License-Identifier: MIT
//! Surface — the rendering collaborator.
//!
//! Every pane owns one [`Surface`]: the widget (or terminal region, or test
//! double) that actually shows it. The layout engine tells it where it lives,
//! how far to scroll and when to repaint; it asks back only for the current
//! scrollbar values and how much room visible scrollbars take.
//!
//! [`NullSurface`] is the headless implementation. It records everything it
//! is told in a shared [`SurfaceState`] so a driver or a test can look at it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::geometry::Rect;
use crate::pane::PaneId;

/// Room taken by visible scrollbars, 0 when hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollbarSizes {
    pub vertical_width: i32,
    pub horizontal_height: i32,
}

/// What a pane needs from its widget.
pub trait Surface: Send {
    /// Move and resize to `rect` (canvas pixels).
    fn set_geometry(&mut self, rect: Rect);

    /// Shift the scrolled content by a pixel delta.
    fn scroll_by(&mut self, dx: i32, dy: i32);

    /// Take keyboard focus.
    fn focus(&mut self);

    /// Place the overlay cursor indicator, relative to the visible origin.
    fn place_cursor(&mut self, x: i32, y: i32);

    /// Stop showing; the pane is gone.
    fn hide(&mut self);

    fn request_paint(&mut self);

    /// Current scrollbar values `(x, y)`.
    fn scroll_position(&self) -> (i32, i32);

    fn scrollbar_sizes(&self) -> ScrollbarSizes;
}

/// Builds a surface for each new pane.
pub trait SurfaceFactory: Send + Sync {
    fn create(&self, pane: PaneId) -> Box<dyn Surface>;
}

// ---------------------------------------------------------------------------
// NullSurface
// ---------------------------------------------------------------------------

/// Everything a [`NullSurface`] has been told.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceState {
    pub rect: Rect,
    pub scroll: (i32, i32),
    pub cursor: (i32, i32),
    pub scrollbars: ScrollbarSizes,
    pub focused: bool,
    pub hidden: bool,
    pub paints: usize,
}

/// A surface that draws nothing.
#[derive(Debug, Default)]
pub struct NullSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl NullSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared view of the recorded state.
    #[must_use]
    pub fn state(&self) -> Arc<Mutex<SurfaceState>> {
        Arc::clone(&self.state)
    }
}

impl Surface for NullSurface {
    fn set_geometry(&mut self, rect: Rect) {
        self.state.lock().rect = rect;
    }

    fn scroll_by(&mut self, dx: i32, dy: i32) {
        let mut state = self.state.lock();
        state.scroll.0 += dx;
        state.scroll.1 += dy;
    }

    fn focus(&mut self) {
        self.state.lock().focused = true;
    }

    fn place_cursor(&mut self, x: i32, y: i32) {
        self.state.lock().cursor = (x, y);
    }

    fn hide(&mut self) {
        let mut state = self.state.lock();
        state.hidden = true;
        state.focused = false;
    }

    fn request_paint(&mut self) {
        self.state.lock().paints += 1;
    }

    fn scroll_position(&self) -> (i32, i32) {
        self.state.lock().scroll
    }

    fn scrollbar_sizes(&self) -> ScrollbarSizes {
        self.state.lock().scrollbars
    }
}

/// Creates [`NullSurface`]s and keeps a handle to each one's state.
#[derive(Debug, Default)]
pub struct NullSurfaceFactory {
    surfaces: Mutex<HashMap<PaneId, Arc<Mutex<SurfaceState>>>>,
}

impl NullSurfaceFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the surface created for `pane`.
    #[must_use]
    pub fn state(&self, pane: PaneId) -> Option<SurfaceState> {
        self.surfaces.lock().get(&pane).map(|s| s.lock().clone())
    }

    /// Mutate the surface of `pane` from outside, as a user dragging a
    /// scrollbar would.
    pub fn with_state(&self, pane: PaneId, f: impl FnOnce(&mut SurfaceState)) -> bool {
        let surfaces = self.surfaces.lock();
        let Some(state) = surfaces.get(&pane) else {
            return false;
        };
        f(&mut state.lock());
        true
    }
}

impl SurfaceFactory for NullSurfaceFactory {
    fn create(&self, pane: PaneId) -> Box<dyn Surface> {
        let surface = NullSurface::new();
        self.surfaces.lock().insert(pane, surface.state());
        Box::new(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_surface_records() {
        let mut s = NullSurface::new();
        s.set_geometry(Rect::new(1, 2, 3, 4));
        s.scroll_by(0, 20);
        s.scroll_by(5, -4);
        s.focus();
        s.request_paint();
        s.place_cursor(7, 8);
        let state = s.state().lock().clone();
        assert_eq!(state.rect, Rect::new(1, 2, 3, 4));
        assert_eq!(s.scroll_position(), (5, 16));
        assert_eq!(state.cursor, (7, 8));
        assert!(state.focused);
        assert_eq!(state.paints, 1);

        s.hide();
        assert!(s.state().lock().hidden);
        assert!(!s.state().lock().focused);
    }

    #[test]
    fn factory_tracks_created_surfaces() {
        let factory = NullSurfaceFactory::new();
        let p = PaneId::from_raw(4);
        assert_eq!(factory.state(p), None);
        let mut surface = factory.create(p);
        surface.scroll_by(0, 10);
        assert_eq!(factory.state(p).unwrap().scroll, (0, 10));
        assert!(factory.with_state(p, |s| s.scroll.1 = 99));
        assert_eq!(surface.scroll_position(), (0, 99));
        assert!(!factory.with_state(PaneId::from_raw(5), |_| {}));
    }
}
