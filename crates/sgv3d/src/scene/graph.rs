//! Node arena and tree editing

use slotmap::SlotMap;

use crate::foundation::math::Mat4;
use crate::render::{GraphMesh, ProgramBinding};
use crate::scene::node::{Animator, Geometry, NodeId, NodeKind, SceneNode};
use crate::scene::{SceneError, SceneResult};

/// Arena of scene nodes linked into a tree
///
/// Nodes are created detached and linked with [`add_child`](Self::add_child).
/// Every node has at most one parent and no node is its own ancestor. A
/// geometry mesh is shared by giving several geometry nodes the same
/// [`GraphMesh`]; nodes themselves are never shared.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: Option<NodeId>,
}

impl SceneGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached node
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.insert(SceneNode::new(kind));
        log::trace!("Created {} node {id:?}", self.nodes[id].kind.label());
        id
    }

    /// Insert a detached node with a debug name
    pub fn add_named(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = self.add_node(kind);
        self.nodes[id].name = Some(name.into());
        id
    }

    /// Insert a group node
    pub fn add_group(&mut self) -> NodeId {
        self.add_node(NodeKind::Group)
    }

    /// Insert a static transform node
    pub fn add_transform(&mut self, local: Mat4) -> NodeId {
        self.add_node(NodeKind::Transform(local))
    }

    /// Insert an animation node driven by `animator`
    pub fn add_animation(&mut self, animator: impl Animator + 'static) -> NodeId {
        self.add_node(NodeKind::Animation(Box::new(animator)))
    }

    /// Insert an enabled geometry node
    pub fn add_geometry(&mut self, mesh: GraphMesh) -> NodeId {
        self.add_node(NodeKind::Geometry(Geometry { mesh, enabled: true }))
    }

    /// Insert a node that binds `binding` for its subtree
    pub fn add_context(&mut self, binding: ProgramBinding) -> NodeId {
        self.add_node(NodeKind::Context(binding))
    }

    /// Append `child` to the end of `parent`'s children
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.check_link(parent, child)?;
        self.link(parent, child);
        Ok(())
    }

    /// Append several children in order
    ///
    /// Every child is checked before any is linked, so on error the graph is
    /// unchanged.
    pub fn add_children(&mut self, parent: NodeId, children: &[NodeId]) -> SceneResult<()> {
        for (i, &child) in children.iter().enumerate() {
            self.check_link(parent, child)?;
            if children[..i].contains(&child) {
                return Err(SceneError::AlreadyAttached(child));
            }
        }
        for &child in children {
            self.link(parent, child);
        }
        Ok(())
    }

    /// Detach and return the child at `index`; the child keeps its subtree
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> SceneResult<NodeId> {
        let node = self.node_mut(parent)?;
        let len = node.children.len();
        if index >= len {
            return Err(SceneError::IndexOutOfBounds { index, len });
        }
        let child = node.children.remove(index);
        self.nodes[child].parent = None;
        Ok(child)
    }

    /// Remove `id` and its whole subtree from the graph
    ///
    /// Returns the number of nodes removed. Clears the root if it was inside
    /// the subtree.
    pub fn destroy(&mut self, id: NodeId) -> SceneResult<usize> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            self.nodes[parent].children.retain(|&c| c != id);
        }

        let mut removed = 0;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children);
                removed += 1;
                if self.root == Some(next) {
                    self.root = None;
                }
            }
        }
        log::debug!("Destroyed subtree at {id:?} ({removed} nodes)");
        Ok(removed)
    }

    /// Make `id` the node traversal starts from
    pub fn set_root(&mut self, id: NodeId) -> SceneResult<()> {
        self.node(id)?;
        self.root = Some(id);
        Ok(())
    }

    /// Traversal start node
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look a node up
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    /// Whether `id` names a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Children of `id` in render order
    pub fn children(&self, id: NodeId) -> SceneResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Parent of `id`, if attached
    pub fn parent(&self, id: NodeId) -> SceneResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Behaviour of `id`
    pub fn kind(&self, id: NodeId) -> SceneResult<&NodeKind> {
        Ok(&self.node(id)?.kind)
    }

    /// Replace the matrix of a transform node
    pub fn set_transform(&mut self, id: NodeId, local: Mat4) -> SceneResult<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Transform(m) => {
                *m = local;
                Ok(())
            }
            other => Err(SceneError::InvalidArgument(format!(
                "{id:?} is a {} node, not a transform",
                other.label()
            ))),
        }
    }

    /// Set the draw-enabled flag of a geometry node
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) -> SceneResult<()> {
        self.geometry_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// Flip the draw-enabled flag of a geometry node, returning the new value
    pub fn toggle_draw(&mut self, id: NodeId) -> SceneResult<bool> {
        let geometry = self.geometry_mut(id)?;
        geometry.enabled = !geometry.enabled;
        Ok(geometry.enabled)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove every node
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: NodeId) -> SceneResult<Vec<NodeId>> {
        let mut out = Vec::new();
        let mut current = self.node(id)?.parent;
        while let Some(p) = current {
            out.push(p);
            current = self.nodes[p].parent;
        }
        Ok(out)
    }

    pub(crate) fn node(&self, id: NodeId) -> SceneResult<&SceneNode> {
        self.nodes
            .get(id)
            .ok_or_else(|| SceneError::InvalidArgument(format!("unknown node {id:?}")))
    }

    fn node_mut(&mut self, id: NodeId) -> SceneResult<&mut SceneNode> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| SceneError::InvalidArgument(format!("unknown node {id:?}")))
    }

    fn geometry_mut(&mut self, id: NodeId) -> SceneResult<&mut Geometry> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Geometry(geometry) => Ok(geometry),
            other => Err(SceneError::InvalidArgument(format!(
                "{id:?} is a {} node, not geometry",
                other.label()
            ))),
        }
    }

    fn check_link(&self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        self.node(parent)?;
        let node = self.node(child)?;
        if parent == child {
            return Err(SceneError::InvalidArgument(format!("{child:?} cannot be its own child")));
        }
        if node.parent.is_some() {
            return Err(SceneError::AlreadyAttached(child));
        }
        // child has no parent, so a cycle means child is an ancestor of parent
        let mut current = Some(parent);
        while let Some(p) = current {
            if p == child {
                return Err(SceneError::WouldCycle { parent, child });
            }
            current = self.nodes[p].parent;
        }
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_child_preserves_order() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group();
        let a = graph.add_group();
        let b = graph.add_group();
        graph.add_child(root, a).unwrap();
        graph.add_child(root, b).unwrap();

        assert_eq!(graph.children(root).unwrap(), &[a, b]);
        assert_eq!(graph.parent(b).unwrap(), Some(root));
    }

    #[test]
    fn test_self_link_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.add_group();
        assert!(matches!(graph.add_child(a, a), Err(SceneError::InvalidArgument(_))));
    }

    #[test]
    fn test_second_parent_rejected() {
        let mut graph = SceneGraph::new();
        let p1 = graph.add_group();
        let p2 = graph.add_group();
        let c = graph.add_group();
        graph.add_child(p1, c).unwrap();
        assert_eq!(graph.add_child(p2, c), Err(SceneError::AlreadyAttached(c)));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut graph = SceneGraph::new();
        let a = graph.add_group();
        let b = graph.add_group();
        let c = graph.add_group();
        graph.add_child(a, b).unwrap();
        graph.add_child(b, c).unwrap();
        assert_eq!(graph.add_child(c, a), Err(SceneError::WouldCycle { parent: c, child: a }));
    }

    #[test]
    fn test_add_children_is_all_or_nothing() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group();
        let a = graph.add_group();
        let taken = graph.add_group();
        let other = graph.add_group();
        graph.add_child(other, taken).unwrap();

        assert!(graph.add_children(root, &[a, taken]).is_err());
        assert!(graph.children(root).unwrap().is_empty());
        assert_eq!(graph.parent(a).unwrap(), None);

        assert_eq!(graph.add_children(root, &[a, a]), Err(SceneError::AlreadyAttached(a)));
    }

    #[test]
    fn test_destroyed_node_rejected() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group();
        let gone = graph.add_group();
        graph.destroy(gone).unwrap();
        assert!(matches!(graph.add_child(root, gone), Err(SceneError::InvalidArgument(_))));
    }

    #[test]
    fn test_destroy_is_recursive() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group();
        let t = graph.add_transform(Mat4::identity());
        let leaf = graph.add_group();
        graph.add_child(root, t).unwrap();
        graph.add_child(t, leaf).unwrap();
        graph.set_root(root).unwrap();

        assert_eq!(graph.destroy(t).unwrap(), 2);
        assert!(!graph.contains(leaf));
        assert!(graph.children(root).unwrap().is_empty());
        assert_eq!(graph.root(), Some(root));

        assert_eq!(graph.destroy(root).unwrap(), 1);
        assert_eq!(graph.root(), None);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_remove_child_detaches() {
        let mut graph = SceneGraph::new();
        let root = graph.add_group();
        let a = graph.add_group();
        graph.add_child(root, a).unwrap();

        assert_eq!(graph.remove_child(root, 3), Err(SceneError::IndexOutOfBounds { index: 3, len: 1 }));
        assert_eq!(graph.remove_child(root, 0).unwrap(), a);
        assert_eq!(graph.parent(a).unwrap(), None);

        let other = graph.add_group();
        graph.add_child(other, a).unwrap();
    }

    #[test]
    fn test_set_transform_only_on_transform_nodes() {
        let mut graph = SceneGraph::new();
        let t = graph.add_transform(Mat4::identity());
        let g = graph.add_group();

        graph.set_transform(t, Mat4::new_scaling(2.0)).unwrap();
        assert!(matches!(graph.kind(t).unwrap(), NodeKind::Transform(m) if *m == Mat4::new_scaling(2.0)));
        assert!(graph.set_transform(g, Mat4::identity()).is_err());
        assert!(graph.toggle_draw(g).is_err());
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let mut graph = SceneGraph::new();
        let a = graph.add_named("a", NodeKind::Group);
        let b = graph.add_group();
        let c = graph.add_group();
        graph.add_child(a, b).unwrap();
        graph.add_child(b, c).unwrap();

        assert_eq!(graph.ancestors(c).unwrap(), vec![b, a]);
        assert_eq!(graph.get(a).unwrap().name(), Some("a"));
    }
}
