//! Frame driver
//!
//! Wraps one traversal in the per-frame device protocol: begin the frame,
//! bind the base program, upload camera uniforms, traverse with a fresh
//! [`RenderContext`], end the frame.

use crate::foundation::math::Mat4;
use crate::foundation::time::FrameClock;
use crate::render::{BindingLayout, FreeRoamCamera, GraphicsDevice, ProgramBinding, RenderError};
use crate::scene::context::{FrameStats, RenderContext};
use crate::scene::graph::SceneGraph;

/// Renders a scene graph once per frame
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    layout: BindingLayout,
    binding: ProgramBinding,
    root_transform: Mat4,
    camera: Option<FreeRoamCamera>,
    clear_color: [f32; 4],
    frames: u64,
}

impl SceneRenderer {
    /// Renderer drawing through `binding` with uniforms at `layout`
    pub fn new(layout: BindingLayout, binding: ProgramBinding) -> Self {
        Self {
            layout,
            binding,
            root_transform: Mat4::identity(),
            camera: None,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            frames: 0,
        }
    }

    /// Initial transform every traversal starts from
    pub fn with_root_transform(mut self, root_transform: Mat4) -> Self {
        self.root_transform = root_transform;
        self
    }

    /// Camera whose uniforms are uploaded each frame
    pub fn with_camera(mut self, camera: FreeRoamCamera) -> Self {
        if self.layout.view.is_none() && self.layout.projection.is_none() {
            log::warn!("Camera attached but the program has no view or projection uniform");
        }
        self.camera = Some(camera);
        self
    }

    /// Colour the frame is cleared to
    pub fn with_clear_color(mut self, clear_color: [f32; 4]) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// Attached camera, for input handling between frames
    pub fn camera_mut(&mut self) -> Option<&mut FreeRoamCamera> {
        self.camera.as_mut()
    }

    /// Frames completed
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    /// Render `graph` at `time` seconds
    pub fn render_frame(
        &mut self,
        graph: &SceneGraph,
        device: &mut dyn GraphicsDevice,
        time: f64,
    ) -> Result<FrameStats, RenderError> {
        if graph.root().is_none() {
            return Err(RenderError::MissingRoot);
        }

        device.begin_frame(self.clear_color)?;
        let stats = self.draw_frame(graph, device, time);
        // close the frame even when drawing failed
        device.end_frame()?;
        let stats = stats?;

        self.frames += 1;
        log::trace!("Frame {} at t={time:.3}: {stats:?}", self.frames);
        Ok(stats)
    }

    fn draw_frame(
        &self,
        graph: &SceneGraph,
        device: &mut dyn GraphicsDevice,
        time: f64,
    ) -> Result<FrameStats, RenderError> {
        device.bind_program(self.binding)?;
        if let Some(camera) = &self.camera {
            camera.upload_uniforms(device, &self.layout)?;
        }

        let mut ctx = RenderContext::new(self.root_transform, time, self.binding, self.layout);
        graph.render(&mut ctx, device)
    }

    /// Render `graph` at the time `clock` reports
    pub fn render_with_clock(
        &mut self,
        graph: &SceneGraph,
        device: &mut dyn GraphicsDevice,
        clock: &dyn FrameClock,
    ) -> Result<FrameStats, RenderError> {
        self.render_frame(graph, device, clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use crate::foundation::time::ManualClock;
    use crate::render::{
        BufferUsage, DeviceCommand, DeviceError, Mesh, MeshAttributes, MeshBuffer, PrimitiveMode, ProgramId,
        RecordingDevice, UniformLocation,
    };

    fn setup() -> (RecordingDevice, SceneGraph, SceneRenderer) {
        let mut device = RecordingDevice::new();
        let program = device.register_program(&["model", "view", "projection", "camPos"]);

        let mut mesh = Mesh::new(PrimitiveMode::Points);
        mesh.push_position(Vec3::zeros());
        let mut buffer = MeshBuffer::for_mesh(&mut device, BufferUsage::Static, &mesh).unwrap();
        let point = buffer.bind(mesh, &mut device).unwrap();

        let mut graph = SceneGraph::new();
        let root = graph.add_geometry(point);
        graph.set_root(root).unwrap();

        let layout = BindingLayout {
            view: Some(UniformLocation(1)),
            projection: Some(UniformLocation(2)),
            camera_position: Some(UniformLocation(3)),
            ..BindingLayout::with_model(UniformLocation(0))
        };
        let renderer = SceneRenderer::new(layout, ProgramBinding::new(program, buffer.id()));
        (device, graph, renderer)
    }

    #[test]
    fn test_frame_protocol_order() {
        let (mut device, graph, renderer) = setup();
        let mut renderer = renderer.with_camera(FreeRoamCamera::default()).with_clear_color([0.1, 0.2, 0.3, 1.0]);
        device.clear_commands();

        let stats = renderer.render_frame(&graph, &mut device, 0.0).unwrap();
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(renderer.frame_count(), 1);

        let commands = device.commands();
        assert_eq!(commands.first(), Some(&DeviceCommand::BeginFrame([0.1, 0.2, 0.3, 1.0])));
        assert!(matches!(commands[1], DeviceCommand::BindProgram(_)));
        assert!(matches!(commands[2], DeviceCommand::SetVec3 { location: UniformLocation(3), .. }));
        assert_eq!(commands.last(), Some(&DeviceCommand::EndFrame));
    }

    #[test]
    fn test_root_transform_reaches_geometry() {
        let (mut device, graph, renderer) = setup();
        let root = Mat4::translation(Vec3::new(0.0, 1.0, 0.0));
        let mut renderer = renderer.with_root_transform(root);

        let clock = ManualClock::new(2.5);
        renderer.render_with_clock(&graph, &mut device, &clock).unwrap();
        assert_eq!(device.draws()[0].model, Some(root));
    }

    #[test]
    fn test_missing_root_fails_before_frame() {
        let (mut device, _, mut renderer) = setup();
        device.clear_commands();

        let empty = SceneGraph::new();
        assert_eq!(renderer.render_frame(&empty, &mut device, 0.0), Err(RenderError::MissingRoot));
        assert!(device.commands().is_empty());
        assert_eq!(renderer.frame_count(), 0);
    }

    #[test]
    fn test_failed_bind_still_ends_frame() {
        let (mut device, graph, mut renderer) = setup();
        let buffer = device.create_buffer(MeshAttributes::POSITION).unwrap();
        let layout = BindingLayout::with_model(UniformLocation(0));
        let mut broken = SceneRenderer::new(layout, ProgramBinding::new(ProgramId(99), buffer));
        device.clear_commands();

        assert!(matches!(
            broken.render_frame(&graph, &mut device, 0.0),
            Err(RenderError::Device(DeviceError::UnknownProgram(_)))
        ));
        assert_eq!(device.commands().last(), Some(&DeviceCommand::EndFrame));
        assert_eq!(broken.frame_count(), 0);

        let stats = renderer.render_frame(&graph, &mut device, 0.0).unwrap();
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(renderer.frame_count(), 1);
    }
}
