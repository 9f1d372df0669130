//! Animated polar flower
//!
//! Usage: `animated_flower [step] [petals] [frames] [graph.dot]`
//!
//! Renders `frames` frames at 60 Hz on a headless device and logs what was
//! drawn. Defaults: step 0.01, 100 petals, 120 frames.

use flower_app::{arg_or, build_flower, AppError};
use sgv3d::config::{Config, SceneConfig};
use sgv3d::foundation::logging;
use sgv3d::foundation::math::Vec3;
use sgv3d::foundation::time::{FrameClock, ManualClock};
use sgv3d::render::FreeRoamCamera;
use sgv3d::scene::SceneRenderer;

const CONFIG_PATH: &str = "sgv3d.toml";
const FRAME_TIME: f64 = 1.0 / 60.0;

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("animated_flower: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = SceneConfig::load_or_default(CONFIG_PATH)?;
    logging::init_with_level(&config.log_level);

    let args: Vec<String> = std::env::args().collect();
    let step = arg_or(&args, 1, 0.01, "a positive step")?;
    let petals = arg_or(&args, 2, 100_u32, "a petal count")?;
    let frames = arg_or(&args, 3, 120_u32, "a frame count")?;
    if step <= 0.0 {
        return Err(AppError::Argument {
            index: 1,
            value: step.to_string(),
            expected: "a positive step",
        });
    }

    let mut scene = build_flower(&config, step, petals)?;
    if let Some(path) = args.get(4) {
        scene.graph.write_dot(path)?;
    }

    let mut camera = FreeRoamCamera::default();
    camera.set_position(Vec3::new(0.0, 0.0, 2.0));
    camera.set_projection(45.0, 1.0, 0.1, 100.0);

    let mut renderer = SceneRenderer::new(scene.layout, scene.binding)
        .with_camera(camera)
        .with_clear_color(config.clear_color);

    let clock = ManualClock::new(0.0);
    let mut draws = 0;
    for _ in 0..frames {
        let stats = renderer.render_with_clock(&scene.graph, &mut scene.device, &clock)?;
        draws += stats.draw_calls;
        clock.advance(FRAME_TIME);
        scene.device.clear_commands();
    }

    log::info!(
        "Rendered {} frames ({draws} draws) up to t={:.2}s",
        renderer.frame_count(),
        clock.now()
    );
    Ok(())
}
