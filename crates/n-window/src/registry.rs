// SPDX-License-Identifier: MIT
//! Pane registry — where every live pane is, and how to reach its animator.
//!
//! The registry is the only pane index that may be read off the owning
//! thread: it holds a copy of each pane's node and rectangle plus a cloneable
//! [`ScrollHandle`], so focus search, hit-testing and scroll routing never
//! need the panes themselves. Entries are kept in a `BTreeMap` so every scan
//! visits panes in id order.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::animator::{Completion, ScrollHandle, ScrollRequest};
use crate::geometry::Rect;
use crate::pane::PaneId;
use crate::tree::NodeId;

/// Routing information for one pane.
#[derive(Debug, Clone)]
pub struct PaneEntry {
    pub node: NodeId,
    pub rect: Rect,
    pub scroll: ScrollHandle,
}

/// Where a pane sits, without its scroll handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub pane: PaneId,
    pub node: NodeId,
    pub rect: Rect,
}

/// Ordered map of live panes behind a read-write lock.
#[derive(Debug, Default)]
pub struct PaneRegistry {
    entries: RwLock<BTreeMap<PaneId, PaneEntry>>,
}

impl PaneRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, pane: PaneId, entry: PaneEntry) {
        self.entries.write().insert(pane, entry);
    }

    pub fn remove(&self, pane: PaneId) -> Option<PaneEntry> {
        self.entries.write().remove(&pane)
    }

    /// Record a pane's new place. Returns false for unknown panes.
    pub fn set_placement(&self, pane: PaneId, node: NodeId, rect: Rect) -> bool {
        let mut entries = self.entries.write();
        let Some(entry) = entries.get_mut(&pane) else {
            return false;
        };
        entry.node = node;
        entry.rect = rect;
        true
    }

    #[must_use]
    pub fn get(&self, pane: PaneId) -> Option<PaneEntry> {
        self.entries.read().get(&pane).cloned()
    }

    #[must_use]
    pub fn contains(&self, pane: PaneId) -> bool {
        self.entries.read().contains_key(&pane)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Live pane ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<PaneId> {
        self.entries.read().keys().copied().collect()
    }

    /// Every pane's placement, in id order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Placement> {
        self.entries
            .read()
            .iter()
            .map(|(&pane, entry)| Placement {
                pane,
                node: entry.node,
                rect: entry.rect,
            })
            .collect()
    }

    /// The pane whose rectangle contains the canvas point.
    #[must_use]
    pub fn pane_at(&self, x: i32, y: i32) -> Option<PaneId> {
        self.entries
            .read()
            .iter()
            .find_map(|(&pane, entry)| entry.rect.contains(x, y).then_some(pane))
    }

    /// Send a scroll request to `pane`'s animator. `None` if the pane is
    /// not registered.
    pub fn route(&self, pane: PaneId, request: ScrollRequest) -> Option<Completion> {
        // Clone the handle first: submitting may block on the handoff slot
        // and must not hold the lock while it does.
        let handle = self.entries.read().get(&pane)?.scroll.clone();
        Some(handle.submit(request))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::{AnimatorConfig, ScrollAnimator};
    use crate::update::{Update, UpdateQueue};
    use std::sync::Arc;
    use std::time::Duration;

    fn entry(animator: &ScrollAnimator, node: usize, rect: Rect) -> PaneEntry {
        PaneEntry {
            node: NodeId::from_raw(node),
            rect,
            scroll: animator.handle(),
        }
    }

    fn setup() -> (PaneRegistry, Vec<ScrollAnimator>, Arc<UpdateQueue>) {
        let queue = Arc::new(UpdateQueue::new());
        let registry = PaneRegistry::new();
        let mut animators = Vec::new();
        for (i, x) in [(2, 100), (1, 0)] {
            let pane = PaneId::from_raw(i);
            let config = AnimatorConfig {
                tick: Duration::from_millis(1),
                ..AnimatorConfig::default()
            };
            let animator = ScrollAnimator::spawn(pane, Arc::clone(&queue), config);
            registry.insert(pane, entry(&animator, i * 10, Rect::new(x, 0, 100, 100)));
            animators.push(animator);
        }
        (registry, animators, queue)
    }

    #[test]
    fn snapshot_is_in_id_order() {
        let (registry, _animators, _) = setup();
        let panes: Vec<PaneId> = registry.snapshot().iter().map(|p| p.pane).collect();
        assert_eq!(panes, vec![PaneId::from_raw(1), PaneId::from_raw(2)]);
        assert_eq!(registry.ids(), panes);
    }

    #[test]
    fn hit_testing() {
        let (registry, _animators, _) = setup();
        assert_eq!(registry.pane_at(150, 50), Some(PaneId::from_raw(2)));
        assert_eq!(registry.pane_at(0, 0), Some(PaneId::from_raw(1)));
        assert_eq!(registry.pane_at(200, 0), None);
    }

    #[test]
    fn placement_updates_and_removal() {
        let (registry, _animators, _) = setup();
        let p = PaneId::from_raw(1);
        assert!(registry.set_placement(p, NodeId::from_raw(5), Rect::new(0, 0, 10, 10)));
        assert_eq!(registry.get(p).unwrap().rect, Rect::new(0, 0, 10, 10));
        assert!(registry.remove(p).is_some());
        assert!(!registry.contains(p));
        assert!(!registry.set_placement(p, NodeId::from_raw(5), Rect::ZERO));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn route_reaches_the_animator() {
        let (registry, _animators, queue) = setup();
        let p = PaneId::from_raw(2);
        let done = registry.route(p, ScrollRequest::new(0, 9)).unwrap();
        assert!(done.wait_timeout(Duration::from_secs(5)));
        let moved: i32 = queue
            .drain()
            .iter()
            .filter_map(|u| match u {
                Update::Scroll { pane, dy, .. } if *pane == p => Some(*dy),
                _ => None,
            })
            .sum();
        assert_eq!(moved, 9);
        assert!(registry.route(PaneId::from_raw(9), ScrollRequest::new(0, 1)).is_none());
    }
}
