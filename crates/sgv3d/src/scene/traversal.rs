//! Depth-first render traversal

use crate::foundation::math::Mat4;
use crate::render::{GraphicsDevice, RenderError};
use crate::scene::context::{FrameStats, RenderContext};
use crate::scene::graph::SceneGraph;
use crate::scene::node::{NodeId, NodeKind};

impl SceneGraph {
    /// Render the tree from its root
    pub fn render(
        &self,
        ctx: &mut RenderContext,
        device: &mut dyn GraphicsDevice,
    ) -> Result<FrameStats, RenderError> {
        let root = self.root().ok_or(RenderError::MissingRoot)?;
        self.render_from(root, ctx, device)
    }

    /// Render the subtree rooted at `id`
    ///
    /// The transform stack and program binding are back where they started
    /// when this returns, including on error.
    pub fn render_from(
        &self,
        id: NodeId,
        ctx: &mut RenderContext,
        device: &mut dyn GraphicsDevice,
    ) -> Result<FrameStats, RenderError> {
        let depth = ctx.transforms.depth();
        let mut stats = FrameStats {
            max_depth: depth,
            ..FrameStats::default()
        };
        let binding = ctx.binding;

        let result = self.visit(id, ctx, device, &mut stats);

        while ctx.transforms.depth() > depth {
            ctx.transforms.pop();
        }
        if ctx.binding != binding {
            ctx.binding = binding;
            device.bind_program(binding)?;
        }
        result?;

        log::debug!(
            "Rendered {} nodes, {} draws, depth {}",
            stats.nodes_visited,
            stats.draw_calls,
            stats.max_depth
        );
        Ok(stats)
    }

    /// Accumulated transform `id` receives when rendered at `time`
    ///
    /// Walks from the top ancestor down, multiplying transform and animation
    /// matrices onto `initial`. The node's own transform is included.
    pub fn world_transform(&self, id: NodeId, time: f64, initial: Mat4) -> Result<Mat4, RenderError> {
        let mut path = self.ancestors(id)?;
        path.reverse();
        path.push(id);

        let mut world = initial;
        for node in path {
            if let Some(local) = local_matrix(&self.node(node)?.kind, time) {
                world *= local;
            }
        }
        Ok(world)
    }

    fn visit(
        &self,
        id: NodeId,
        ctx: &mut RenderContext,
        device: &mut dyn GraphicsDevice,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        let node = self.node(id)?;
        stats.nodes_visited += 1;
        log::trace!("Visit {} {id:?} at depth {}", node.kind.label(), ctx.transforms.depth());

        match &node.kind {
            NodeKind::Group => self.visit_children(&node.children, ctx, device, stats),
            NodeKind::Transform(_) | NodeKind::Animation(_) => {
                // Some for both variants
                let local = local_matrix(&node.kind, ctx.time).unwrap_or_else(Mat4::identity);
                ctx.transforms.push(&local);
                stats.max_depth = stats.max_depth.max(ctx.transforms.depth());
                let result = self.visit_children(&node.children, ctx, device, stats);
                ctx.transforms.pop();
                result
            }
            NodeKind::Geometry(geometry) => {
                if geometry.enabled {
                    let bound = ctx.binding.buffer;
                    if geometry.mesh.buffer() != bound {
                        return Err(RenderError::UnboundMesh {
                            mesh: geometry.mesh.buffer(),
                            bound,
                        });
                    }
                    device.set_uniform_mat4(ctx.layout.model, ctx.transforms.top())?;
                    device.draw(geometry.mesh.draw_call())?;
                    stats.draw_calls += 1;
                }
                self.visit_children(&node.children, ctx, device, stats)
            }
            NodeKind::Context(binding) => {
                let previous = ctx.binding;
                device.bind_program(*binding)?;
                ctx.binding = *binding;
                let result = self.visit_children(&node.children, ctx, device, stats);
                ctx.binding = previous;
                device.bind_program(previous)?;
                result
            }
        }
    }

    fn visit_children(
        &self,
        children: &[NodeId],
        ctx: &mut RenderContext,
        device: &mut dyn GraphicsDevice,
        stats: &mut FrameStats,
    ) -> Result<(), RenderError> {
        for &child in children {
            self.visit(child, ctx, device, stats)?;
        }
        Ok(())
    }
}

fn local_matrix(kind: &NodeKind, time: f64) -> Option<Mat4> {
    match kind {
        NodeKind::Transform(local) => Some(*local),
        NodeKind::Animation(animator) => Some(animator.animate(time)),
        NodeKind::Group | NodeKind::Geometry(_) | NodeKind::Context(_) => None,
    }
}
