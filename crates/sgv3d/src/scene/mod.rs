//! Scene graph
//!
//! Nodes live in an arena owned by [`SceneGraph`] and are linked into a
//! strict tree. One depth-first traversal per frame accumulates the model
//! transform and issues a draw at every enabled geometry node.
//!
//! ## Traversal
//!
//! ```text
//! Transform(S) ── push top*S ─┬─ Animation(f) ── push top*f(t) ── Geometry ─▶ draw(top)
//!                             │                  pop
//!                             └─ Geometry ─▶ draw(top)
//!              pop
//! ```
//!
//! Parent transforms are applied before a node's own, so a geometry node sees
//! `World = Initial * L1 * ... * Ln` over its transform ancestors.

mod context;
mod graph;
mod graphviz;
mod node;
mod renderer;
mod traversal;


pub use context::{FrameStats, MatrixStack, RenderContext};
pub use graph::SceneGraph;
pub use node::{Animator, Geometry, NodeId, NodeKind, SceneNode};
pub use renderer::SceneRenderer;

/// Errors from building or editing a scene graph
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// A node id is unknown, destroyed, or otherwise unusable for the call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Child already has a parent
    #[error("Node {0:?} is already attached to a parent")]
    AlreadyAttached(NodeId),

    /// Link would make a node its own ancestor
    #[error("Linking {child:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// Requested parent
        parent: NodeId,
        /// Requested child
        child: NodeId,
    },

    /// Child index past the end of a child list
    #[error("Child index {index} out of bounds for {len} children")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of children
        len: usize,
    },
}

/// Result type for scene graph edits
pub type SceneResult<T> = Result<T, SceneError>;
