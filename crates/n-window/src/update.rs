// SPDX-License-Identifier: MIT
//! Update queue — how background work reaches pane state.
//!
//! Animator threads and row-jump threads never touch a pane. They publish an
//! [`Update`] to the editor-wide [`UpdateQueue`] and raise the redraw signal;
//! the owning thread waits on that signal, drains the whole queue at once and
//! applies it (see [`Workspace::drain_updates`](crate::workspace::Workspace::drain_updates)).
//!
//! The signal coalesces: raising it while it is already pending is a no-op,
//! so a burst of ticks from several panes produces one wake-up and one drain.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::geometry::Rect;
use crate::pane::PaneId;
use crate::position::Position;

/// A state change to apply on the owning thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// One animation frame: shift the pane's scroll offsets.
    Scroll { pane: PaneId, dx: i32, dy: i32 },
    /// The pane's animation finished (or was settled by a newer request).
    Settled { pane: PaneId },
    /// The pane's cursor moved.
    CursorMoved { pane: PaneId, pos: Position },
    /// A row jump finished scrolling and the cursor should land at `pos`.
    JumpLanded { pane: PaneId, pos: Position },
    /// The pane's rectangle changed.
    Geometry { pane: PaneId, rect: Rect },
    /// The pane became active.
    Focus { pane: PaneId },
    /// The pane was closed.
    Closed { pane: PaneId },
    /// Everything should be repainted.
    Invalidate,
}

impl Update {
    /// The pane this update is about, if any.
    #[must_use]
    pub const fn pane(&self) -> Option<PaneId> {
        match *self {
            Self::Scroll { pane, .. }
            | Self::Settled { pane }
            | Self::CursorMoved { pane, .. }
            | Self::JumpLanded { pane, .. }
            | Self::Geometry { pane, .. }
            | Self::Focus { pane }
            | Self::Closed { pane } => Some(pane),
            Self::Invalidate => None,
        }
    }
}

/// FIFO of updates plus a coalescing redraw signal.
#[derive(Debug, Default)]
pub struct UpdateQueue {
    queue: Mutex<VecDeque<Update>>,
    pending: Mutex<bool>,
    ready: Condvar,
}

impl UpdateQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `update` without raising the signal.
    pub fn push(&self, update: Update) {
        self.queue.lock().push_back(update);
    }

    /// Raise the redraw signal. No-op while one is already pending.
    pub fn signal(&self) {
        let mut pending = self.pending.lock();
        if !*pending {
            *pending = true;
            self.ready.notify_all();
        }
    }

    /// Queue `update` and raise the signal.
    pub fn publish(&self, update: Update) {
        self.push(update);
        self.signal();
    }

    /// Block until the signal is raised or `timeout` passes. Consumes the
    /// signal; returns whether it was raised.
    pub fn wait_redraw(&self, timeout: Duration) -> bool {
        let mut pending = self.pending.lock();
        if !*pending {
            self.ready.wait_while_for(&mut pending, |p| !*p, timeout);
        }
        std::mem::replace(&mut *pending, false)
    }

    /// True while a raised signal has not been consumed.
    #[must_use]
    pub fn is_signaled(&self) -> bool {
        *self.pending.lock()
    }

    /// Take every queued update, oldest first.
    pub fn drain(&self) -> Vec<Update> {
        self.queue.lock().drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
