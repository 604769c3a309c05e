// SPDX-License-Identifier: MIT
//! # n-window — Window layout for n-nvim
//!
//! The layout and viewport-navigation engine behind `:split`, `:vsplit`,
//! `:close`, `CTRL-W x` and `CTRL-W h/j/k/l`:
//!
//! - **[`tree`]** — `SplitTree`, the n-ary split tree, and its geometry pass
//! - **[`geometry`]** — `Rect`, `Orientation`, remainder-exact distribution
//! - **[`focus`]** — directional neighbor search over pane rectangles
//! - **[`animator`]** — per-pane smooth-scroll worker threads
//! - **[`pane`]** — a leaf viewport: cursor, scroll offsets, gutter
//! - **[`registry`]** — thread-safe pane lookup for background workers
//! - **[`workspace`]** — the façade the editor drives
//!
//! Rendering and text storage stay outside: panes talk to a [`Surface`] and
//! a [`Document`], with [`NullSurface`] and [`RopeDocument`] as the headless
//! implementations.

pub mod animator;
pub mod cursor;
pub mod document;
pub mod error;
pub mod focus;
pub mod geometry;
pub mod options;
pub mod pane;
pub mod position;
pub mod registry;
pub mod surface;
pub mod tree;
pub mod update;
pub mod workspace;

pub use animator::{AnimatorConfig, Completion, ScrollAnimator, ScrollHandle, ScrollPlan, ScrollRequest};
pub use cursor::Cursor;
pub use document::{Document, FontMetrics, RopeDocument};
pub use error::LayoutError;
pub use focus::Direction;
pub use geometry::{Orientation, Rect};
pub use options::{OptionError, Options};
pub use pane::{PaintPlan, Pane, PaneId};
pub use position::Position;
pub use registry::{PaneRegistry, Placement};
pub use surface::{NullSurface, NullSurfaceFactory, Surface, SurfaceFactory};
pub use tree::{NodeId, Shape, SplitTree};
pub use update::{Update, UpdateQueue};
pub use workspace::Workspace;
