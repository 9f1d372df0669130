//! Flower demo scenes
//!
//! Scene builders shared by the demo binaries. Both demos run headless on a
//! [`RecordingDevice`] and report what a real device would have drawn.

use std::f64::consts::PI;
use std::str::FromStr;

use sgv3d::config::{ConfigError, SceneConfig};
use sgv3d::foundation::math::{Mat4, Mat4Ext, Vec3, Vec4};
use sgv3d::render::{
    BindingLayout, BufferUsage, Mesh, MeshAttributes, MeshBuffer, MeshError, PrimitiveMode, ProgramBinding,
    RecordingDevice, RenderError,
};
use sgv3d::scene::{Animator, NodeId, SceneError, SceneGraph};
use thiserror::Error;

/// Demo application errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad command line argument
    #[error("Invalid argument {index} ({value:?}): expected {expected}")]
    Argument {
        /// Position on the command line
        index: usize,
        /// Text given
        value: String,
        /// What was expected
        expected: &'static str,
    },

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Mesh could not be bound
    #[error("Mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Scene could not be built
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Frame failed
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// File output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Positional argument `index`, or `default` when absent
pub fn arg_or<T: FromStr>(args: &[String], index: usize, default: T, expected: &'static str) -> Result<T, AppError> {
    match args.get(index) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| AppError::Argument {
            index,
            value: value.clone(),
            expected,
        }),
    }
}

/// Parameter samples `0, step, 2*step, ...` up to and including 1
fn samples(step: f64) -> impl Iterator<Item = f64> {
    let count = (1.0 / step + 1e-9).floor() as usize;
    (0..=count).map(move |i| i as f64 * step)
}

fn polar(r: f64, theta: f64) -> Vec3 {
    Vec3::new((r * theta.cos()) as f32, (r * theta.sin()) as f32, 0.0)
}

/// One petal ring of the polar rose `r = sin(θ)cos(θ)` as line segments
pub fn flower_lines(step: f64, color: Vec4) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveMode::Lines);
    for t1 in samples(step) {
        let t2 = t1 + step;
        let (theta1, theta2) = (2.0 * PI * t1, 2.0 * PI * t2);
        mesh.push_colored(polar(theta1.sin() * theta1.cos(), theta1), color);
        mesh.push_colored(polar(theta2.sin() * theta2.cos(), theta2), color);
    }
    mesh
}

/// Pulsing spin applied to one petal ring
///
/// Rings further along the flower (`percent` towards 1) pulse faster.
#[derive(Debug, Clone, Copy)]
pub struct PetalAnimation {
    /// Position of this ring among all rings, in `[0, 1)`
    pub percent: f64,
}

impl Animator for PetalAnimation {
    fn animate(&self, time: f64) -> Mat4 {
        let phase = (6.0 * self.percent * time).sin() as f32;
        let spin = Mat4::rotation_z(phase);
        let grow = 0.7 + 0.5 * phase;
        spin * Mat4::nonuniform_scale(Vec3::new(grow, grow, 0.0))
    }
}

/// Graph, device and program set up for one demo
pub struct HeadlessScene {
    /// Scene tree
    pub graph: SceneGraph,
    /// Recording device standing in for a GPU
    pub device: RecordingDevice,
    /// Program and buffer every geometry draws through
    pub binding: ProgramBinding,
    /// Resolved uniform locations
    pub layout: BindingLayout,
}

fn register_program(device: &mut RecordingDevice, config: &SceneConfig) -> sgv3d::render::ProgramId {
    let names = &config.uniforms;
    device.register_program(&[
        names.model_matrix.as_str(),
        names.view_matrix.as_str(),
        names.projection_matrix.as_str(),
        names.camera_position.as_str(),
        names.camera_direction.as_str(),
    ])
}

/// Flower of `petals` rings, each `root → rotate → animate → geometry`
///
/// All rings share one dynamic buffer.
pub fn build_flower(config: &SceneConfig, step: f64, petals: u32) -> Result<HeadlessScene, AppError> {
    let mut device = RecordingDevice::new();
    let program = register_program(&mut device, config);
    let mut buffer = MeshBuffer::new(
        &mut device,
        BufferUsage::Dynamic,
        MeshAttributes::POSITION | MeshAttributes::COLOR,
    )?;

    let mut graph = SceneGraph::new();
    let root = graph.add_named("flower", sgv3d::scene::NodeKind::Group);
    graph.set_root(root)?;

    for i in 0..petals {
        let p = f64::from(i) / f64::from(petals);
        let gmesh = buffer.bind(flower_lines(step, Vec4::new(p as f32, 0.0, 1.0, 1.0)), &mut device)?;

        let turn = graph.add_transform(Mat4::rotation_z((p * PI / 4.0) as f32));
        let pulse = graph.add_animation(PetalAnimation { percent: p });
        let leaf = graph.add_geometry(gmesh);
        graph.add_child(root, turn)?;
        graph.add_child(turn, pulse)?;
        graph.add_child(pulse, leaf)?;
    }
    log::info!(
        "Built flower: {petals} rings, {} vertices in {} uploads",
        buffer.vertex_count(),
        buffer.upload_count()
    );

    let layout = BindingLayout::resolve(&config.uniforms, program, &device)?;
    Ok(HeadlessScene {
        graph,
        device,
        binding: ProgramBinding::new(program, buffer.id()),
        layout,
    })
}

/// Many-petal rose traced as one line mesh, coloured along its parameter
pub fn plotter_mesh(step: f64, petals: u32) -> Mesh {
    let n = f64::from(petals.max(1));
    let theta_of = |t: f64| n * 2.0 * PI * t;
    let r_of = |theta: f64| {
        let ring = (theta / (2.0 * PI)).floor().clamp(0.0, n - 1.0);
        let petal_theta = theta + ring * PI / (2.0 * n);
        let amplitude = 5.0 * (ring / n).sin() * (ring / n).cos();
        amplitude * petal_theta.sin() * petal_theta.cos()
    };

    let mut mesh = Mesh::new(PrimitiveMode::Lines);
    for t1 in samples(step) {
        let t2 = t1 + step;
        for t in [t1, t2] {
            let theta = theta_of(t);
            mesh.push_colored(polar(r_of(theta), theta), Vec4::new(t as f32, 0.0, 1.0 - t as f32, 1.0));
        }
    }
    mesh
}

/// Transform mapping the box `[min, max]` onto `[-1, 1]` in x and y
pub fn fit_bounds(min: (f32, f32), max: (f32, f32)) -> Mat4 {
    let size = ((max.0 - min.0).max(f32::EPSILON), (max.1 - min.1).max(f32::EPSILON));
    let center = ((min.0 + max.0) * 0.5, (min.1 + max.1) * 0.5);
    let scale = Mat4::nonuniform_scale(Vec3::new(2.0 / size.0, 2.0 / size.1, 1.0));
    scale * Mat4::translation(Vec3::new(-center.0, -center.1, 0.0))
}

/// Plotter scene: a single geometry root in a static buffer
pub fn build_plotter(config: &SceneConfig, step: f64, petals: u32) -> Result<(HeadlessScene, NodeId), AppError> {
    let mut device = RecordingDevice::new();
    let program = register_program(&mut device, config);

    let mesh = plotter_mesh(step, petals);
    let mut buffer = MeshBuffer::for_mesh(&mut device, BufferUsage::Static, &mesh)?;
    let gmesh = buffer.bind(mesh, &mut device)?;

    let mut graph = SceneGraph::new();
    let root = graph.add_geometry(gmesh);
    graph.set_root(root)?;

    let layout = BindingLayout::resolve(&config.uniforms, program, &device)?;
    Ok((
        HeadlessScene {
            graph,
            device,
            binding: ProgramBinding::new(program, buffer.id()),
            layout,
        },
        root,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sgv3d::foundation::math::Point3;
    use sgv3d::scene::SceneRenderer;

    #[test]
    fn test_flower_lines_pairs_segments() {
        let mesh = flower_lines(0.25, Vec4::new(1.0, 0.0, 1.0, 1.0));
        // t = 0, 0.25, 0.5, 0.75, 1.0
        assert_eq!(mesh.vertex_count(), 10);
        assert_eq!(mesh.colors.len(), 10);
        assert_relative_eq!(mesh.positions[0], Vec3::zeros(), epsilon = 1e-6);
    }

    #[test]
    fn test_petal_animation_at_time_zero() {
        let m = PetalAnimation { percent: 0.5 }.animate(0.0);
        let p = m.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(p, Point3::new(0.7, 0.7, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_flower_scene_draws_every_ring() {
        let config = SceneConfig::default();
        let mut scene = build_flower(&config, 0.1, 8).unwrap();
        assert_eq!(scene.graph.len(), 1 + 8 * 3);

        let mut renderer = SceneRenderer::new(scene.layout, scene.binding);
        let stats = renderer.render_frame(&scene.graph, &mut scene.device, 1.0).unwrap();
        assert_eq!(stats.draw_calls, 8);
        assert_eq!(stats.max_depth, 3);

        let draws = scene.device.draws();
        assert_eq!(draws[0].call.range.first, 0);
        assert_eq!(draws[1].call.range.first, draws[0].call.range.count);
    }

    #[test]
    fn test_fit_bounds_maps_corners() {
        let m = fit_bounds((-2.0, 0.0), (2.0, 4.0));
        let lo = m.transform_point(&Point3::new(-2.0, 0.0, 0.0));
        let hi = m.transform_point(&Point3::new(2.0, 4.0, 0.0));
        assert_relative_eq!(lo, Point3::new(-1.0, -1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(hi, Point3::new(1.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_plotter_scene_single_draw() {
        let (mut scene, root) = build_plotter(&SceneConfig::default(), 0.05, 20).unwrap();
        assert_eq!(scene.graph.root(), Some(root));

        let mut renderer = SceneRenderer::new(scene.layout, scene.binding);
        let stats = renderer.render_frame(&scene.graph, &mut scene.device, 0.0).unwrap();
        assert_eq!(stats.draw_calls, 1);
    }

    #[test]
    fn test_bad_argument_reported() {
        let args = vec!["prog".to_string(), "abc".to_string()];
        assert!(matches!(
            arg_or::<f64>(&args, 1, 0.01, "a number"),
            Err(AppError::Argument { index: 1, .. })
        ));
        assert_eq!(arg_or::<u32>(&args, 2, 100, "a count").unwrap(), 100);
    }
}
