//! Property-based invariant tests for the split tree and focus navigator.
//!
//! 1. Leaf rectangles tile the canvas: no overlap, no gap, nothing outside
//! 2. Splitting a leaf and closing the new one restores every rectangle
//! 3. Directional neighbors are mutual: the way back always finds a pane
//! 4. In a row of columns, walking right then left returns to the start
//! 5. No panics on arbitrary operation sequences

use n_window::focus::{self, Direction};
use n_window::geometry::{Orientation, Rect};
use n_window::pane::PaneId;
use n_window::registry::Placement;
use n_window::tree::SplitTree;
use proptest::collection::vec;
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Split(usize, bool),
    Close(usize),
    Exchange(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..64, any::<bool>()).prop_map(|(i, v)| Op::Split(i, v)),
        1 => (0usize..64).prop_map(Op::Close),
        1 => (0usize..64).prop_map(Op::Exchange),
    ]
}

fn canvas_strategy() -> impl Strategy<Value = Rect> {
    (0i32..50, 0i32..50, 1i32..2000, 1i32..1200).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

const DIRECTIONS: [Direction; 4] = [Direction::Above, Direction::Below, Direction::Left, Direction::Right];

/// Apply `ops`, labelling new leaves in creation order. The last leaf is
/// never closed, so the tree stays non-empty.
fn build(ops: &[Op]) -> SplitTree<u32> {
    let mut tree = SplitTree::new(0);
    let mut next = 1;
    for op in ops {
        let leaves = tree.leaves();
        match *op {
            Op::Split(i, vertical) => {
                let label = next;
                next += 1;
                let _ = tree.split(leaves[i % leaves.len()], Orientation::from_vertical(vertical), |_| label);
            }
            Op::Close(i) if leaves.len() > 1 => {
                let _ = tree.close(leaves[i % leaves.len()]);
            }
            Op::Close(_) => {}
            Op::Exchange(i) => {
                let _ = tree.exchange(leaves[i % leaves.len()]);
            }
        }
    }
    tree
}

/// Leaf rectangles keyed by label, in layout order.
fn labelled(tree: &SplitTree<u32>) -> Vec<(u32, Rect)> {
    tree.leaf_rects()
        .into_iter()
        .filter_map(|(node, rect)| tree.payload(node).map(|&label| (label, rect)))
        .collect()
}

fn placements(tree: &SplitTree<u32>) -> Vec<Placement> {
    tree.leaf_rects()
        .into_iter()
        .filter_map(|(node, rect)| {
            tree.payload(node).map(|&label| Placement {
                pane: PaneId::from_raw(label as usize),
                node,
                rect,
            })
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Leaves tile the canvas
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn leaves_tile_the_canvas(ops in vec(op_strategy(), 0..40), canvas in canvas_strategy()) {
        let mut tree = build(&ops);
        prop_assert!(!tree.is_empty());
        tree.layout(canvas);

        let rects = labelled(&tree);
        prop_assert_eq!(rects.len(), tree.len());

        let area: i64 = rects.iter().map(|(_, r)| r.area()).sum();
        prop_assert_eq!(area, canvas.area());

        for (i, (_, a)) in rects.iter().enumerate() {
            prop_assert!(a.width >= 0 && a.height >= 0, "negative size {}", a);
            prop_assert!(a.x >= canvas.x && a.right() <= canvas.right(), "{} outside {}", a, canvas);
            prop_assert!(a.y >= canvas.y && a.bottom() <= canvas.bottom(), "{} outside {}", a, canvas);
            for (_, b) in &rects[i + 1..] {
                prop_assert!(!a.intersects(*b), "{} overlaps {}", a, b);
            }
        }
    }

    #[test]
    fn layout_is_idempotent(ops in vec(op_strategy(), 0..30), canvas in canvas_strategy()) {
        let mut tree = build(&ops);
        tree.layout(canvas);
        let first = labelled(&tree);
        tree.layout(canvas);
        prop_assert_eq!(labelled(&tree), first);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Split then close is the identity on geometry
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn split_then_close_restores_geometry(
        ops in vec(op_strategy(), 0..30),
        pick in 0usize..64,
        vertical in any::<bool>(),
        canvas in canvas_strategy(),
    ) {
        let mut tree = build(&ops);
        tree.layout(canvas);
        let before = labelled(&tree);

        let leaves = tree.leaves();
        let target = leaves[pick % leaves.len()];
        let outcome = tree.split(target, Orientation::from_vertical(vertical), |_| u32::MAX).unwrap();
        tree.layout(canvas);
        prop_assert_eq!(tree.len(), before.len() + 1);

        let closed = tree.close(outcome.created).unwrap();
        prop_assert_eq!(closed.payload, u32::MAX);
        tree.layout(canvas);
        prop_assert_eq!(labelled(&tree), before);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Neighbors are mutual
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn neighbors_are_mutual(ops in vec(op_strategy(), 0..30), canvas in canvas_strategy()) {
        let mut tree = build(&ops);
        tree.layout(canvas);
        let all = placements(&tree);

        for from in &all {
            for dir in DIRECTIONS {
                let Some(to) = focus::neighbor(from, dir, &all) else { continue };
                prop_assert_ne!(to.pane, from.pane);
                prop_assert!(focus::is_adjacent(to.rect, from.rect, dir.opposite()));
                prop_assert!(focus::neighbor(&to, dir.opposite(), &all).is_some());
            }
        }
    }

    #[test]
    fn neighbor_ignores_candidate_order(ops in vec(op_strategy(), 0..30), canvas in canvas_strategy()) {
        let mut tree = build(&ops);
        tree.layout(canvas);
        let all = placements(&tree);
        let mut reversed = all.clone();
        reversed.reverse();

        for from in &all {
            for dir in DIRECTIONS {
                prop_assert_eq!(focus::neighbor(from, dir, &all), focus::neighbor(from, dir, &reversed));
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Column round trip
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn columns_round_trip(columns in 1usize..12, width in 100i32..2000, height in 1i32..500) {
        let mut tree = SplitTree::new(0u32);
        for label in 1..columns {
            let last = *tree.leaves().last().unwrap();
            let label = u32::try_from(label).unwrap();
            tree.split(last, Orientation::Vertical, |_| label).unwrap();
        }
        tree.layout(Rect::new(0, 0, width, height));
        let all = placements(&tree);
        prop_assert_eq!(all.len(), columns);

        let mut at = all[0];
        for _ in 1..columns {
            at = focus::neighbor(&at, Direction::Right, &all).unwrap();
        }
        prop_assert_eq!(at.rect.right(), width);
        prop_assert!(focus::neighbor(&at, Direction::Right, &all).is_none());
        for _ in 1..columns {
            at = focus::neighbor(&at, Direction::Left, &all).unwrap();
        }
        prop_assert_eq!(at.pane, all[0].pane);
        prop_assert!(focus::neighbor(&at, Direction::Below, &all).is_none());
    }
}
