// SPDX-License-Identifier: MIT
//! Workspace — the application-facing window manager.
//!
//! The workspace owns the split tree of panes, the pane registry and the
//! update queue, and exposes the window commands an editor binds to keys:
//! `:split`/`:vsplit`, `:close`, `CTRL-W x`, `CTRL-W h/j/k/l`, scrolling and
//! cursor moves on the focused pane.
//!
//! Every structural command recomputes geometry for the whole tree and
//! pushes the new rectangles into panes, surfaces and the registry. Invalid
//! structural requests are logged at `warn` and otherwise ignored; the editor
//! never sees a layout error.
//!
//! Background work lands through [`drain_updates`](Workspace::drain_updates),
//! which the owning thread calls after [`wait_redraw`](Workspace::wait_redraw)
//! returns:
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # use n_window::{Workspace, Options, Rect, RopeDocument, NullSurfaceFactory};
//! let doc = Arc::new(RopeDocument::from_text("hello\nworld\n"));
//! let mut ws = Workspace::new(doc, Arc::new(NullSurfaceFactory::new()), Rect::new(0, 0, 800, 600), Options::default());
//! ws.scroll_rows(10, true);
//! while ws.wait_redraw(Duration::from_millis(100)) {
//!     ws.drain_updates();
//! }
//! ```

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, warn};

use crate::animator::Completion;
use crate::document::Document;
use crate::error::LayoutError;
use crate::focus::{self, Direction};
use crate::geometry::{Orientation, Rect};
use crate::options::{OptionError, Options};
use crate::pane::{PaintPlan, Pane, PaneId};
use crate::position::Position;
use crate::registry::{PaneEntry, PaneRegistry, Placement};
use crate::surface::SurfaceFactory;
use crate::tree::{Closed, NodeId, SplitTree};
use crate::update::{Update, UpdateQueue};

/// The window manager of one editor instance.
pub struct Workspace {
    tree: SplitTree<Pane>,
    registry: Arc<PaneRegistry>,
    queue: Arc<UpdateQueue>,
    surfaces: Arc<dyn SurfaceFactory>,
    options: Options,
    canvas: Rect,
    focus: Option<PaneId>,
    next_pane: usize,
}

impl Workspace {
    /// A workspace showing `document` in one pane that fills `canvas`.
    #[must_use]
    pub fn new(
        document: Arc<dyn Document>,
        surfaces: Arc<dyn SurfaceFactory>,
        canvas: Rect,
        options: Options,
    ) -> Self {
        let queue = Arc::new(UpdateQueue::new());
        let id = PaneId::from_raw(1);
        let pane = Pane::new(
            id,
            NodeId::from_raw(0),
            document,
            surfaces.create(id),
            Arc::clone(&queue),
            &options,
        );
        let registry = Arc::new(PaneRegistry::new());
        registry.insert(
            id,
            PaneEntry {
                node: NodeId::from_raw(0),
                rect: Rect::ZERO,
                scroll: pane.scroll_handle(),
            },
        );
        let tree = SplitTree::new(pane);

        let mut workspace = Self {
            tree,
            registry,
            queue,
            surfaces,
            options,
            canvas,
            focus: None,
            next_pane: 2,
        };
        workspace.relayout();
        if let Some(root) = workspace.tree.root() {
            workspace.set_focus(root);
        }
        workspace
    }

    // -- Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn canvas(&self) -> Rect {
        self.canvas
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub const fn tree(&self) -> &SplitTree<Pane> {
        &self.tree
    }

    /// Shared registry, usable from other threads.
    #[must_use]
    pub fn registry(&self) -> Arc<PaneRegistry> {
        Arc::clone(&self.registry)
    }

    /// Shared update queue, for producers outside the workspace.
    #[must_use]
    pub fn queue(&self) -> Arc<UpdateQueue> {
        Arc::clone(&self.queue)
    }

    /// Number of panes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// True once every pane has been closed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The focused pane's id.
    #[must_use]
    pub const fn focused(&self) -> Option<PaneId> {
        self.focus
    }

    /// The focused pane's node.
    #[must_use]
    pub fn focused_node(&self) -> Option<NodeId> {
        self.registry.get(self.focus?).map(|e| e.node)
    }

    #[must_use]
    pub fn focused_pane(&self) -> Option<&Pane> {
        self.pane(self.focus?)
    }

    #[must_use]
    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.tree.payload(self.registry.get(id)?.node)
    }

    /// Panes in layout order.
    #[must_use]
    pub fn panes(&self) -> Vec<&Pane> {
        self.tree
            .leaves()
            .into_iter()
            .filter_map(|node| self.tree.payload(node))
            .collect()
    }

    /// The registry's view of every pane, in id order.
    #[must_use]
    pub fn placements(&self) -> Vec<Placement> {
        self.registry.snapshot()
    }

    #[must_use]
    pub fn paint_plan(&self, id: PaneId) -> Option<PaintPlan> {
        self.pane(id).map(|p| p.paint_plan(&self.options))
    }

    // -- Geometry -----------------------------------------------------------

    /// Resize the canvas and lay the panes out again.
    pub fn resize(&mut self, canvas: Rect) {
        debug!("resize to {canvas}");
        self.canvas = canvas;
        self.relayout();
    }

    /// Recompute geometry for the whole tree and push it everywhere.
    fn relayout(&mut self) {
        self.tree.layout(self.canvas);
        for (node, rect) in self.tree.leaf_rects() {
            let Some(pane) = self.tree.payload_mut(node) else { continue };
            pane.set_node(node);
            let moved = pane.rect() != rect;
            pane.set_rect(rect, &self.options);
            self.registry.set_placement(pane.id(), node, rect);
            if moved {
                self.queue.push(Update::Geometry { pane: pane.id(), rect });
            }
        }
        self.queue.signal();
    }

    // -- Structure ----------------------------------------------------------

    /// Split the focused pane. Returns the new pane.
    pub fn split(&mut self, orientation: Orientation) -> Option<PaneId> {
        let node = self.require_focus()?;
        self.split_node(node, orientation)
    }

    /// Split the pane at `node`. The new pane shows the same document at
    /// the same cursor and scroll position; focus stays on the original.
    pub fn split_node(&mut self, node: NodeId, orientation: Orientation) -> Option<PaneId> {
        let id = PaneId::from_raw(self.next_pane);
        let surfaces = &self.surfaces;
        let options = &self.options;
        let outcome = self
            .tree
            .split(node, orientation, |source| source.fork(id, node, surfaces.create(id), options));
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!("split {orientation}: {err}");
                return None;
            }
        };
        self.next_pane += 1;

        if let Some(pane) = self.tree.payload(outcome.created) {
            self.registry.insert(
                id,
                PaneEntry {
                    node: outcome.created,
                    rect: Rect::ZERO,
                    scroll: pane.scroll_handle(),
                },
            );
        }
        debug!("split {node} {orientation}: new pane {id}");
        self.relayout();
        self.set_focus(outcome.original);
        Some(id)
    }

    /// Close the focused pane. Returns the node that received focus.
    pub fn close(&mut self) -> Option<NodeId> {
        let node = self.require_focus()?;
        self.close_node(node)
    }

    /// Close the pane at `node`.
    ///
    /// The pane's animator is stopped and its surface hidden. If it was
    /// focused, focus moves to its previous sibling (or the next one if it
    /// was first). The last pane is never closed, however the tree above it
    /// is shaped. Returns the node that holds focus afterwards, `None` if
    /// nothing was closed.
    pub fn close_node(&mut self, node: NodeId) -> Option<NodeId> {
        if self.tree.len() == 1 {
            warn!("close: {}", LayoutError::LastPane(node));
            return None;
        }
        let Closed { mut payload, focus } = match self.tree.close(node) {
            Ok(closed) => closed,
            Err(err) => {
                warn!("close: {err}");
                return None;
            }
        };
        let id = payload.id();
        self.registry.remove(id);
        payload.shutdown();
        drop(payload);
        self.queue.push(Update::Closed { pane: id });
        debug!("closed pane {id}");

        let was_focused = self.focus == Some(id);
        if was_focused {
            self.focus = None;
        }
        self.relayout();

        if let (true, Some(target)) = (was_focused, focus) {
            self.set_focus(target);
        }
        self.focused_node()
    }

    /// Swap the focused pane with its neighbor.
    pub fn exchange(&mut self) -> Option<NodeId> {
        let node = self.require_focus()?;
        self.exchange_node(node)
    }

    /// Swap `node` with its next sibling (previous if last). Focus moves
    /// to whatever now occupies `node`'s old slot.
    pub fn exchange_node(&mut self, node: NodeId) -> Option<NodeId> {
        let target = match self.tree.exchange(node) {
            Ok(target) => target,
            Err(err) => {
                warn!("exchange: {err}");
                return None;
            }
        };
        self.relayout();
        self.set_focus(target);
        self.focused_node()
    }

    // -- Focus --------------------------------------------------------------

    /// Focus the first leaf under `node`. Returns whether focus moved there.
    pub fn set_focus(&mut self, node: NodeId) -> bool {
        let Some(leaf) = self.tree.first_leaf(node) else {
            warn!("focus: {}", LayoutError::UnknownNode(node));
            return false;
        };
        let Some(id) = self.tree.payload(leaf).map(Pane::id) else {
            return false;
        };
        let previous = self
            .focus
            .filter(|&old| old != id)
            .and_then(|old| self.registry.get(old));
        if let Some(pane) = previous.and_then(|entry| self.tree.payload_mut(entry.node)) {
            pane.deactivate();
        }
        self.focus = Some(id);
        if let Some(pane) = self.tree.payload_mut(leaf) {
            pane.activate();
        }
        self.queue.publish(Update::Focus { pane: id });
        true
    }

    /// Click-to-focus.
    pub fn focus_pane(&mut self, id: PaneId) -> bool {
        match self.registry.get(id) {
            Some(entry) => self.set_focus(entry.node),
            None => {
                debug!("focus: no pane {id}");
                false
            }
        }
    }

    /// Focus the pane under a canvas point.
    pub fn focus_at(&mut self, x: i32, y: i32) -> bool {
        self.registry.pane_at(x, y).is_some_and(|id| self.focus_pane(id))
    }

    /// Move focus from `node` to its neighbor in `dir`. No neighbor is a
    /// silent no-op.
    pub fn focus_in_direction(&mut self, node: NodeId, dir: Direction) -> bool {
        let Some(pane) = self.tree.payload(node) else {
            warn!("focus {dir}: {}", LayoutError::NotALeaf(node));
            return false;
        };
        let from = Placement {
            pane: pane.id(),
            node,
            rect: pane.rect(),
        };
        match focus::neighbor(&from, dir, &self.registry.snapshot()) {
            Some(target) => {
                debug!("focus {dir}: pane {} -> {}", from.pane, target.pane);
                self.set_focus(target.node)
            }
            None => {
                debug!("focus {dir}: nothing next to pane {}", from.pane);
                false
            }
        }
    }

    pub fn focus_above(&mut self) -> bool {
        self.focus_direction(Direction::Above)
    }

    pub fn focus_below(&mut self) -> bool {
        self.focus_direction(Direction::Below)
    }

    pub fn focus_left(&mut self) -> bool {
        self.focus_direction(Direction::Left)
    }

    pub fn focus_right(&mut self) -> bool {
        self.focus_direction(Direction::Right)
    }

    fn focus_direction(&mut self, dir: Direction) -> bool {
        self.require_focus()
            .is_some_and(|node| self.focus_in_direction(node, dir))
    }

    fn require_focus(&self) -> Option<NodeId> {
        let node = self.focused_node();
        if node.is_none() {
            warn!("{}", LayoutError::Empty);
        }
        node
    }

    // -- Scrolling and cursor -----------------------------------------------

    /// Run `f` on the focused pane.
    fn with_focused<R>(&mut self, f: impl FnOnce(&mut Pane, &Options) -> R) -> Option<R> {
        let node = self.require_focus()?;
        let pane = self.tree.payload_mut(node)?;
        Some(f(pane, &self.options))
    }

    /// Bring the focused pane's cursor into view.
    pub fn scroll_to_cursor(&mut self) -> Option<Completion> {
        self.with_focused(|pane, options| pane.scroll_to_cursor(options))
    }

    /// Scroll the focused pane by `rows` lines (see [`Pane::scroll_rows`]).
    pub fn scroll_rows(&mut self, rows: isize, jump: bool) -> Option<JoinHandle<()>> {
        self.with_focused(|pane, options| pane.scroll_rows(rows, jump, options))
            .flatten()
    }

    /// Move the focused pane's cursor (see [`Pane::cursor_to`]).
    pub fn cursor_to(&mut self, rows: isize, cols: isize, sticky: bool) -> Option<Completion> {
        self.with_focused(|pane, options| pane.cursor_to(rows, cols, sticky, options))
            .flatten()
    }

    /// Place the focused pane's cursor (see [`Pane::scroll_to`]).
    pub fn scroll_to(&mut self, pos: Position, jump: bool) -> Option<Completion> {
        self.with_focused(|pane, options| pane.scroll_to(pos, jump, options))
            .flatten()
    }

    /// Adopt a pane's surface scrollbar values after it scrolled on its own.
    pub fn sync_scroll_from_surface(&mut self, id: PaneId) {
        let Some(entry) = self.registry.get(id) else { return };
        if let Some(pane) = self.tree.payload_mut(entry.node) {
            pane.sync_scroll_from_surface(&self.options);
        }
    }

    // -- Updates ------------------------------------------------------------

    /// Block until background work has published something, or `timeout`.
    pub fn wait_redraw(&self, timeout: Duration) -> bool {
        self.queue.wait_redraw(timeout)
    }

    /// Apply every queued update to pane state. Returns them, oldest first,
    /// for the caller to repaint from.
    pub fn drain_updates(&mut self) -> Vec<Update> {
        let updates = self.queue.drain();
        for update in &updates {
            let Some(id) = update.pane() else { continue };
            let Some(entry) = self.registry.get(id) else { continue };
            let Some(pane) = self.tree.payload_mut(entry.node) else { continue };
            match *update {
                Update::Scroll { dx, dy, .. } => pane.apply_scroll(dx, dy, &self.options),
                Update::Settled { .. } => pane.settled(),
                Update::JumpLanded { pos, .. } => pane.land_jump(pos),
                _ => {}
            }
        }
        updates
    }

    /// Ask every pane to repaint.
    pub fn invalidate_all(&mut self) {
        for node in self.tree.leaves() {
            if let Some(pane) = self.tree.payload_mut(node) {
                pane.request_paint();
            }
        }
        self.queue.publish(Update::Invalidate);
    }

    /// Apply a `:set` argument string. Returns what the directives asked to
    /// show. Display options take effect at once; `scrolltick` applies to
    /// panes created afterwards.
    ///
    /// # Errors
    ///
    /// See [`Options::set`].
    pub fn set_option(&mut self, args: &str) -> Result<Vec<String>, OptionError> {
        let result = self.options.set(args);
        self.relayout();
        self.invalidate_all();
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
