//! Rendering boundary
//!
//! Everything between the scene graph and a graphics device lives here:
//! client meshes and their bound form, the device trait and its recording
//! implementation, resolved uniform layouts and the camera.
//!
//! ```text
//! Mesh ──bind──▶ MeshBuffer ──▶ GraphMesh ──▶ Geometry node
//!                    │                              │
//!                    ▼                              ▼
//!              GraphicsDevice ◀──── draw ──── traversal
//! ```

pub mod camera;
pub mod device;
pub mod graph_mesh;
pub mod layout;
pub mod mesh;
pub mod mesh_buffer;
pub mod recording;

pub use camera::{FreeRoamCamera, MoveKeys};
pub use device::{
    BufferId, BufferUsage, DeviceError, DeviceResult, DrawCall, GraphicsDevice, IndexRange, ProgramBinding,
    ProgramId, UniformLocation,
};
pub use graph_mesh::GraphMesh;
pub use layout::BindingLayout;
pub use mesh::{Mesh, MeshAttributes, PrimitiveMode, Vertex};
pub use mesh_buffer::{MeshBuffer, MeshError};
pub use recording::{DeviceCommand, RecordedDraw, RecordingDevice};

use crate::scene::SceneError;

/// Errors raised while setting up or rendering a frame
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The graph has no root to render from
    #[error("No root node set for rendering")]
    MissingRoot,

    /// A required uniform is absent from the program
    #[error("Uniform \"{name}\" not found in program {program:?}")]
    MissingUniform {
        /// Program searched
        program: ProgramId,
        /// Uniform name
        name: String,
    },

    /// A geometry node draws from a buffer that is not bound
    ///
    /// Only possible when a mesh is placed under the wrong program binding.
    #[error("Geometry uses buffer {mesh:?} but {bound:?} is bound")]
    UnboundMesh {
        /// Buffer the mesh lives in
        mesh: BufferId,
        /// Buffer bound at the time of the draw
        bound: BufferId,
    },

    /// Scene structure error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Device rejected a command
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),
}
