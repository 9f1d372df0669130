//! # SGV3D
//!
//! A small scene graph for composing 3D scenes out of groups, transforms,
//! animations and geometry, walked once per frame to issue draw calls against
//! a graphics device.
//!
//! ## Features
//!
//! - **Arena scene tree**: nodes addressed by [`scene::NodeId`], strict
//!   single-parent links, recursive destruction
//! - **Transform stack traversal**: `World = Parent * Local`, siblings isolated
//! - **Mesh binding**: client meshes moved into static or append-only dynamic
//!   device buffers
//! - **Device boundary**: everything behind [`render::GraphicsDevice`], with a
//!   headless [`render::RecordingDevice`]
//!
//! ## Quick Start
//!
//! ```rust
//! use sgv3d::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut device = RecordingDevice::new();
//!     let program = device.register_program(&["model"]);
//!
//!     let mut mesh = Mesh::new(PrimitiveMode::Points);
//!     mesh.push_position(Vec3::new(1.0, 0.0, 0.0));
//!     let mut buffer = MeshBuffer::for_mesh(&mut device, BufferUsage::Static, &mesh)?;
//!     let point = buffer.bind(mesh, &mut device)?;
//!
//!     let mut graph = SceneGraph::new();
//!     let spin = graph.add_animation(|t: f64| Mat4::rotation_z(t as f32));
//!     let leaf = graph.add_geometry(point);
//!     graph.add_child(spin, leaf)?;
//!     graph.set_root(spin)?;
//!
//!     let layout = BindingLayout::resolve(&UniformNames::default(), program, &device)?;
//!     let mut renderer = SceneRenderer::new(layout, ProgramBinding::new(program, buffer.id()));
//!     let stats = renderer.render_frame(&graph, &mut device, 0.5)?;
//!     assert_eq!(stats.draw_calls, 1);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::cast_possible_truncation)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, SceneConfig, UniformNames},
        foundation::{
            math::{Mat4, Mat4Ext, Vec3, Vec4},
            time::{FrameClock, ManualClock, Timer},
        },
        render::{
            BindingLayout, BufferUsage, FreeRoamCamera, GraphMesh, GraphicsDevice, Mesh, MeshBuffer,
            PrimitiveMode, ProgramBinding, RecordingDevice, RenderError,
        },
        scene::{FrameStats, NodeId, NodeKind, RenderContext, SceneGraph, SceneRenderer},
    };
}
