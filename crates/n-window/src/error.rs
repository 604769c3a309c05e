// SPDX-License-Identifier: MIT
//! Typed errors for the layout engine.
//!
//! Nothing in the layout core is fatal. Structural operations return these
//! errors so the caller can tell *why* a split or close did nothing; the
//! [`Workspace`](crate::workspace::Workspace) logs them and carries on, which
//! makes the log the diagnostic channel for invalid requests.

use thiserror::Error;

use crate::tree::NodeId;

/// Why a structural operation on the split tree had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The node id does not refer to a live node.
    #[error("node {0} is not in the layout")]
    UnknownNode(NodeId),

    /// The operation needs a leaf but the node has children.
    #[error("node {0} is a split, not a pane")]
    NotALeaf(NodeId),

    /// The node has no parent (it is the root) so it cannot be closed or
    /// exchanged through the tree.
    #[error("node {0} has no parent")]
    Detached(NodeId),

    /// Every pane has been closed.
    #[error("layout has no panes")]
    Empty,

    /// Closing the node would leave no pane on screen.
    #[error("node {0} holds the last pane")]
    LastPane(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_node() {
        let id = NodeId::from_raw(7);
        assert_eq!(LayoutError::NotALeaf(id).to_string(), "node #7 is a split, not a pane");
        assert_eq!(LayoutError::Detached(id).to_string(), "node #7 has no parent");
        assert_eq!(LayoutError::Empty.to_string(), "layout has no panes");
        assert_eq!(LayoutError::LastPane(id).to_string(), "node #7 holds the last pane");
    }
}
