//! Scene node variants

use std::fmt;

use crate::foundation::math::Mat4;
use crate::render::{GraphMesh, ProgramBinding};

slotmap::new_key_type! {
    /// Handle to a node in a [`SceneGraph`](super::SceneGraph)
    pub struct NodeId;
}

/// Time-driven transform source
///
/// Evaluated once per traversal with the frame time. Implementations must not
/// depend on earlier calls: the same time always yields the same matrix.
pub trait Animator {
    /// Local transform at `time` seconds
    fn animate(&self, time: f64) -> Mat4;
}

impl<F> Animator for F
where
    F: Fn(f64) -> Mat4,
{
    fn animate(&self, time: f64) -> Mat4 {
        self(time)
    }
}

/// A drawable range plus its draw-enabled flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Bound mesh range
    pub mesh: GraphMesh,
    /// Whether traversal issues a draw for this node
    pub enabled: bool,
}

/// What a node does when traversal reaches it
pub enum NodeKind {
    /// Renders its children in order
    Group,
    /// Applies a fixed local matrix to its subtree
    Transform(Mat4),
    /// Applies a matrix computed from the frame time to its subtree
    Animation(Box<dyn Animator>),
    /// Draws a mesh range, then renders its children
    Geometry(Geometry),
    /// Binds a program for its subtree
    Context(ProgramBinding),
}

impl NodeKind {
    /// Short label used in debug output
    pub fn label(&self) -> &'static str {
        match self {
            Self::Group => "Group",
            Self::Transform(_) => "Trans.",
            Self::Animation(_) => "Anim.",
            Self::Geometry(_) => "Geom.",
            Self::Context(_) => "Ctx.",
        }
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => f.write_str("Group"),
            Self::Transform(m) => f.debug_tuple("Transform").field(m).finish(),
            Self::Animation(_) => f.write_str("Animation(..)"),
            Self::Geometry(g) => f.debug_tuple("Geometry").field(g).finish(),
            Self::Context(b) => f.debug_tuple("Context").field(b).finish(),
        }
    }
}

/// One slot in the scene arena
#[derive(Debug)]
pub struct SceneNode {
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) name: Option<String>,
}

impl SceneNode {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            parent: None,
            name: None,
        }
    }

    /// Node behaviour
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Children in render order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Parent, if attached
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Debug name, if one was given
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
