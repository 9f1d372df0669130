//! Per-frame traversal state

use crate::foundation::math::Mat4;
use crate::render::{BindingLayout, ProgramBinding};

/// Stack of accumulated model transforms
///
/// Never empty: the bottom entry is the initial transform the frame started
/// with, and [`pop`](Self::pop) refuses to remove it.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: Vec<Mat4>,
}

impl MatrixStack {
    /// Stack holding only `initial`
    pub fn new(initial: Mat4) -> Self {
        Self { stack: vec![initial] }
    }

    /// Accumulated transform
    pub fn top(&self) -> &Mat4 {
        // new() seeds one entry and pop() keeps it
        &self.stack[self.stack.len() - 1]
    }

    /// Push `top * local`
    pub fn push(&mut self, local: &Mat4) {
        let next = self.top() * local;
        self.stack.push(next);
    }

    /// Drop the most recent push; the initial entry stays
    pub fn pop(&mut self) -> Option<Mat4> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Current number of entries, including the initial one
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

/// State carried through one traversal
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Accumulated transforms
    pub transforms: MatrixStack,
    /// Frame time in seconds, fed to animation nodes
    pub time: f64,
    /// Program and buffer bound on the device
    pub binding: ProgramBinding,
    /// Uniform locations for the bound program
    pub layout: BindingLayout,
}

impl RenderContext {
    /// Fresh context for one frame
    pub fn new(initial: Mat4, time: f64, binding: ProgramBinding, layout: BindingLayout) -> Self {
        Self {
            transforms: MatrixStack::new(initial),
            time,
            binding,
            layout,
        }
    }
}

/// Counters gathered during a traversal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Nodes entered
    pub nodes_visited: usize,
    /// Draws issued
    pub draw_calls: usize,
    /// Deepest transform stack, including the initial entry
    pub max_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use approx::assert_relative_eq;

    #[test]
    fn test_push_multiplies_on_the_right() {
        let mut stack = MatrixStack::new(Mat4::uniform_scale(2.0));
        stack.push(&Mat4::translation(Vec3::new(5.0, 0.0, 0.0)));

        let p = stack.top().transform_point(&crate::foundation::math::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 12.0, epsilon = 1e-5);
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_pop_keeps_initial() {
        let initial = Mat4::uniform_scale(3.0);
        let mut stack = MatrixStack::new(initial);
        stack.push(&Mat4::identity());
        stack.push(&Mat4::identity());

        assert!(stack.pop().is_some());
        assert!(stack.pop().is_some());
        assert!(stack.pop().is_none());
        assert_eq!(*stack.top(), initial);
        assert_eq!(stack.depth(), 1);
    }
}
