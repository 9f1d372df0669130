//! Bound mesh handle

use crate::render::device::{BufferId, DrawCall, IndexRange};
use crate::render::mesh::PrimitiveMode;

/// A mesh after it has been moved into a device buffer
///
/// Only the range inside the shared buffer and the primitive mode survive
/// binding. The handle is `Copy`; any number of geometry nodes may draw the
/// same range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphMesh {
    buffer: BufferId,
    mode: PrimitiveMode,
    range: IndexRange,
    indexed: bool,
}

impl GraphMesh {
    pub(crate) fn new(buffer: BufferId, mode: PrimitiveMode, range: IndexRange, indexed: bool) -> Self {
        Self { buffer, mode, range, indexed }
    }

    /// Buffer set the range lives in
    pub fn buffer(&self) -> BufferId {
        self.buffer
    }

    /// Primitive assembly mode
    pub fn mode(&self) -> PrimitiveMode {
        self.mode
    }

    /// Vertex range, or index range when [`uses_indices`](Self::uses_indices)
    pub fn range(&self) -> IndexRange {
        self.range
    }

    /// Whether the range addresses the index buffer
    pub fn uses_indices(&self) -> bool {
        self.indexed
    }

    /// The draw this mesh issues
    pub fn draw_call(&self) -> DrawCall {
        DrawCall {
            mode: self.mode,
            range: self.range,
            indexed: self.indexed,
        }
    }
}
