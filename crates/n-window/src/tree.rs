// SPDX-License-Identifier: MIT
//! Split tree — the recursive layout of panes.
//!
//! Each leaf holds one payload (in the editor, a [`Pane`](crate::pane::Pane));
//! each internal node arranges an ordered list of children either side by
//! side ([`Orientation::Vertical`]) or stacked ([`Orientation::Horizontal`]).
//! Unlike a binary split tree, a node may hold any number of children:
//! `:vsplit` twice in a row yields one vertical node with three leaves.
//!
//! ```text
//! Vertical
//! ├── Leaf(a)          ← left column
//! ├── Horizontal
//! │   ├── Leaf(b)      ← middle column, top
//! │   └── Leaf(c)      ← middle column, bottom
//! └── Leaf(d)          ← right column
//! ```
//!
//! # Ownership
//!
//! Nodes live in an arena indexed by [`NodeId`]. Parent → children edges are
//! the owning direction; the child → parent link is a plain id used for
//! lookups only, so there are no reference cycles. Ids are allocated
//! monotonically and never reused, so a stale id can only ever miss.
//! Released slots stay behind as `None`: the arena grows by at most two
//! slots per split for the lifetime of the tree and is never compacted,
//! since compaction would renumber ids still held by panes and the registry.
//!
//! # Geometry
//!
//! [`SplitTree::set_size`] and [`SplitTree::set_pos`] distribute pixels
//! top-down. The size of a subtree along an axis is proportional to
//! [`SplitTree::split_count`], the number of leaves a pure slice along that
//! axis would produce, so every leaf in a row of equal splits gets the same
//! width no matter how deeply it is nested.

use log::debug;

use crate::error::LayoutError;
use crate::geometry::{self, Orientation, Rect};

/// Identifier of a node in a [`SplitTree`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Wrap a raw arena index.
    #[inline]
    #[must_use]
    pub const fn from_raw(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug)]
struct Node<T> {
    /// Arrangement of `children`. Meaningless on leaves.
    orientation: Orientation,
    rect: Rect,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    /// `Some` exactly when the node is a leaf.
    payload: Option<T>,
}

impl<T> Node<T> {
    const fn leaf(payload: T, parent: Option<NodeId>, orientation: Orientation, rect: Rect) -> Self {
        Self {
            orientation,
            rect,
            children: Vec::new(),
            parent,
            payload: Some(payload),
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Result of a successful [`SplitTree::split`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    /// The node now holding the original payload. Differs from the split
    /// node when the split converted it into an internal node.
    pub original: NodeId,
    /// The freshly created leaf.
    pub created: NodeId,
}

/// Result of a successful [`SplitTree::close`].
#[derive(Debug)]
pub struct Closed<T> {
    /// The payload of the removed leaf.
    pub payload: T,
    /// Where focus should go next, `None` if the tree is now empty.
    pub focus: Option<NodeId>,
}

/// A normalized, comparable description of a tree's layout.
///
/// Internal nodes with a single child are elided: they occupy exactly their
/// child's rectangle and carry no layout information of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape<K> {
    Leaf(K),
    Split {
        orientation: Orientation,
        children: Vec<Self>,
    },
}

/// The split tree. Generic over the leaf payload so the layout logic can be
/// exercised without live panes.
#[derive(Debug)]
pub struct SplitTree<T> {
    nodes: Vec<Option<Node<T>>>,
    root: Option<NodeId>,
}

impl<T> SplitTree<T> {
    /// A tree with a single leaf.
    #[must_use]
    pub fn new(payload: T) -> Self {
        Self {
            nodes: vec![Some(Node::leaf(payload, None, Orientation::Horizontal, Rect::ZERO))],
            root: Some(NodeId(0)),
        }
    }

    // -- Queries ---------------------------------------------------------------

    /// The root node, `None` once every leaf has been closed.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// True once every leaf has been closed.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .filter(|n| n.payload.is_some())
            .count()
    }

    /// True if `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// True if `id` is a live leaf.
    #[must_use]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_leaf)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Children of `id` in layout order. Empty for leaves and unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    #[must_use]
    pub fn orientation(&self, id: NodeId) -> Option<Orientation> {
        self.get(id).map(|n| n.orientation)
    }

    /// Geometry computed by the last [`layout`](Self::layout) or
    /// [`set_size`](Self::set_size)/[`set_pos`](Self::set_pos) pass.
    #[must_use]
    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.get(id).map(|n| n.rect)
    }

    #[must_use]
    pub fn payload(&self, id: NodeId) -> Option<&T> {
        self.get(id)?.payload.as_ref()
    }

    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id.0)?.as_mut()?.payload.as_mut()
    }

    /// Descend through first children until a leaf is reached.
    #[must_use]
    pub fn first_leaf(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let node = self.get(current)?;
            if node.is_leaf() {
                return Some(current);
            }
            current = node.children[0];
        }
    }

    /// All leaves, depth-first, in layout order.
    #[must_use]
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(root) = self.root {
            self.collect_leaves(root, &mut out);
        }
        out
    }

    fn collect_leaves(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.get(id) else { return };
        if node.is_leaf() {
            out.push(id);
            return;
        }
        for &child in &node.children {
            self.collect_leaves(child, out);
        }
    }

    /// The first leaf whose payload satisfies `pred`.
    pub fn find_leaf(&self, mut pred: impl FnMut(&T) -> bool) -> Option<NodeId> {
        self.leaves()
            .into_iter()
            .find(|&id| self.payload(id).is_some_and(&mut pred))
    }

    /// Leaf rectangles in layout order.
    #[must_use]
    pub fn leaf_rects(&self) -> Vec<(NodeId, Rect)> {
        self.leaves()
            .into_iter()
            .filter_map(|id| Some((id, self.rect(id)?)))
            .collect()
    }

    /// Normalized layout description, keyed by `key(payload)` at the leaves.
    pub fn shape<K>(&self, key: impl Fn(&T) -> K) -> Option<Shape<K>> {
        self.root.map(|root| self.shape_of(root, &key))
    }

    fn shape_of<K>(&self, id: NodeId, key: &impl Fn(&T) -> K) -> Shape<K> {
        let node = self.node(id).unwrap_or_else(|_| unreachable!("live child {id}"));
        if let Some(payload) = &node.payload {
            return Shape::Leaf(key(payload));
        }
        if let [only] = node.children.as_slice() {
            return self.shape_of(*only, key);
        }
        Shape::Split {
            orientation: node.orientation,
            children: node.children.iter().map(|&c| self.shape_of(c, key)).collect(),
        }
    }

    // -- Mutations -------------------------------------------------------------

    /// Split the leaf `id` along `orientation`.
    ///
    /// `make` builds the new leaf's payload from the original one and is
    /// only called once the split is known to succeed. If the parent already
    /// splits along `orientation` the new leaf becomes the next sibling;
    /// otherwise `id` turns into an internal node holding the original
    /// payload and the new leaf, in that order.
    ///
    /// Geometry is not recomputed; call [`layout`](Self::layout) afterwards.
    pub fn split(
        &mut self,
        id: NodeId,
        orientation: Orientation,
        make: impl FnOnce(&T) -> T,
    ) -> Result<SplitOutcome, LayoutError> {
        let node = self.node(id)?;
        let (Some(original), true) = (node.payload.as_ref(), node.is_leaf()) else {
            return Err(LayoutError::NotALeaf(id));
        };
        let rect = node.rect;
        let parent = node.parent;
        let fresh = make(original);

        let same_axis = match parent {
            Some(parent) => self.node(parent)?.orientation == orientation,
            None => false,
        };
        if let (Some(parent), true) = (parent, same_axis) {
            let created = self.alloc(Node::leaf(fresh, Some(parent), orientation, rect));
            let siblings = &mut self.node_mut(parent)?.children;
            let at = siblings.iter().position(|&c| c == id).map_or(siblings.len(), |i| i + 1);
            siblings.insert(at, created);
            debug!("split {id} {orientation}: sibling {created} under {parent}");
            return Ok(SplitOutcome {
                original: id,
                created,
            });
        }

        let node = self.node_mut(id)?;
        let payload = node.payload.take().ok_or(LayoutError::NotALeaf(id))?;
        let kept_orientation = node.orientation;
        node.orientation = orientation;

        let kept = self.alloc(Node::leaf(payload, Some(id), kept_orientation, rect));
        let created = self.alloc(Node::leaf(fresh, Some(id), orientation, rect));
        self.node_mut(id)?.children = vec![kept, created];
        debug!("split {id} {orientation}: converted, children {kept} {created}");
        Ok(SplitOutcome {
            original: kept,
            created,
        })
    }

    /// Remove the leaf `id` from the tree.
    ///
    /// Parents left without children are removed recursively; if that
    /// reaches the root the tree becomes empty. The returned focus target is
    /// the sibling before the removed node, or the new first sibling if the
    /// removed node was first.
    ///
    /// The root leaf cannot be closed through the tree: closing the last
    /// pane is the application's business.
    pub fn close(&mut self, id: NodeId) -> Result<Closed<T>, LayoutError> {
        let node = self.node(id)?;
        if !node.is_leaf() {
            return Err(LayoutError::NotALeaf(id));
        }
        let Some(parent) = node.parent else {
            return Err(LayoutError::Detached(id));
        };

        let focus = self.detach(id, parent)?;
        let payload = self
            .release(id)
            .and_then(|n| n.payload)
            .ok_or(LayoutError::UnknownNode(id))?;
        debug!("closed {id}, focus -> {focus:?}");
        Ok(Closed { payload, focus })
    }

    /// Unlink `id` from `parent`, collapsing emptied ancestors.
    fn detach(&mut self, id: NodeId, parent: NodeId) -> Result<Option<NodeId>, LayoutError> {
        let siblings = &mut self.node_mut(parent)?.children;
        let Some(index) = siblings.iter().position(|&c| c == id) else {
            return Err(LayoutError::UnknownNode(id));
        };
        siblings.remove(index);
        if let Some(&next) = siblings.get(index.saturating_sub(1)) {
            return Ok(Some(next));
        }

        // The parent is empty now: it goes too.
        match self.node(parent)?.parent {
            Some(grandparent) => {
                let focus = self.detach(parent, grandparent)?;
                self.release(parent);
                Ok(focus)
            }
            None => {
                self.release(parent);
                self.root = None;
                Ok(None)
            }
        }
    }

    /// Swap `id` with its next sibling (its previous one if it is last).
    ///
    /// An only child moves its parent instead. Returns the node now
    /// occupying `id`'s former slot, which is where focus belongs.
    pub fn exchange(&mut self, id: NodeId) -> Result<NodeId, LayoutError> {
        let parent = self.node(id)?.parent.ok_or(LayoutError::Detached(id))?;
        let siblings = &mut self.node_mut(parent)?.children;
        if siblings.len() == 1 {
            return self.exchange(parent);
        }
        let index = siblings
            .iter()
            .position(|&c| c == id)
            .ok_or(LayoutError::UnknownNode(id))?;
        let other = if index + 1 == siblings.len() { index - 1 } else { index + 1 };
        siblings.swap(index, other);
        let focus = siblings[index];
        debug!("exchanged {id} with {focus} under {parent}");
        Ok(focus)
    }

    // -- Geometry --------------------------------------------------------------

    /// Number of leaves produced by slicing `id` purely along `axis`.
    ///
    /// Nodes split along `axis` add their children's counts; nodes split
    /// the other way take the maximum, because their children sit side by
    /// side across the axis and share its full length.
    #[must_use]
    pub fn split_count(&self, id: NodeId, axis: Orientation) -> usize {
        let Some(node) = self.get(id) else { return 0 };
        if node.is_leaf() {
            return 1;
        }
        let counts = node.children.iter().map(|&c| self.split_count(c, axis));
        if node.orientation == axis {
            counts.sum()
        } else {
            counts.max().unwrap_or(1)
        }
    }

    /// Size the whole tree along `axis` with `unit` pixels per split slot.
    ///
    /// The root receives `unit × split_count(root, axis)`; every node passes
    /// its extent on to its children (see [`set_extent`](Self::set_extent)).
    pub fn set_size(&mut self, axis: Orientation, unit: i32) {
        let Some(root) = self.root else { return };
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let slots = self.split_count(root, axis) as i32;
        self.set_extent(root, axis, unit.saturating_mul(slots));
    }

    /// Give `id` an extent of `extent` pixels along `axis` and distribute it
    /// to the subtree.
    ///
    /// Children of a node split along `axis` get shares proportional to
    /// their own split counts (remainders spread by cumulative rounding, so
    /// the shares always sum to `extent`). Children of a node split the
    /// other way each get the full `extent`.
    pub fn set_extent(&mut self, id: NodeId, axis: Orientation, extent: i32) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::as_mut) else {
            return;
        };
        axis.set_extent(&mut node.rect, extent);
        if node.is_leaf() {
            return;
        }
        let children = node.children.clone();
        if node.orientation == axis {
            let weights: Vec<usize> = children.iter().map(|&c| self.split_count(c, axis)).collect();
            let shares = geometry::distribute(extent, &weights);
            for (child, share) in children.into_iter().zip(shares) {
                self.set_extent(child, axis, share);
            }
        } else {
            for child in children {
                self.set_extent(child, axis, extent);
            }
        }
    }

    /// Position the tree with its root at `(x, y)`.
    ///
    /// Walks depth-first; each node advances the offset along its own split
    /// axis by each child's extent. Sizes must already be set.
    pub fn set_pos(&mut self, x: i32, y: i32) {
        if let Some(root) = self.root {
            self.set_pos_at(root, x, y);
        }
    }

    fn set_pos_at(&mut self, id: NodeId, mut x: i32, mut y: i32) {
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::as_mut) else {
            return;
        };
        node.rect.x = x;
        node.rect.y = y;
        let orientation = node.orientation;
        let children = node.children.clone();
        for child in children {
            self.set_pos_at(child, x, y);
            let Some(rect) = self.rect(child) else { continue };
            match orientation {
                Orientation::Vertical => x += rect.width,
                Orientation::Horizontal => y += rect.height,
            }
        }
    }

    /// Size and position the whole tree so it tiles `canvas` exactly.
    pub fn layout(&mut self, canvas: Rect) {
        let Some(root) = self.root else { return };
        self.set_extent(root, Orientation::Vertical, canvas.width);
        self.set_extent(root, Orientation::Horizontal, canvas.height);
        self.set_pos(canvas.x, canvas.y);
    }

    // -- Arena -----------------------------------------------------------------

    fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.0)?.as_ref()
    }

    fn node(&self, id: NodeId) -> Result<&Node<T>, LayoutError> {
        self.get(id).ok_or(LayoutError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<T>, LayoutError> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(LayoutError::UnknownNode(id))
    }

    /// Append a slot. Freed slots are not recycled.
    fn alloc(&mut self, node: Node<T>) -> NodeId {
        self.nodes.push(Some(node));
        NodeId(self.nodes.len() - 1)
    }

    fn release(&mut self, id: NodeId) -> Option<Node<T>> {
        self.nodes.get_mut(id.0)?.take()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
