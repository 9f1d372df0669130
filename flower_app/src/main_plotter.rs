//! Parametric plotter
//!
//! Usage: `parametric_plotter [step] [xmin] [xmax] [ymin] [ymax]`
//!
//! Builds a 200 petal rose and renders one frame with the plot box fitted
//! to the viewport.

use flower_app::{arg_or, build_plotter, fit_bounds, AppError};
use sgv3d::config::{Config, SceneConfig};
use sgv3d::foundation::logging;
use sgv3d::scene::SceneRenderer;

const CONFIG_PATH: &str = "sgv3d.toml";
const PETALS: u32 = 200;

fn main() {
    if let Err(e) = run() {
        log::error!("{e}");
        eprintln!("parametric_plotter: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let config = SceneConfig::load_or_default(CONFIG_PATH)?;
    logging::init_with_level(&config.log_level);

    let args: Vec<String> = std::env::args().collect();
    let step: f64 = arg_or(&args, 1, 0.01, "a positive step")?;
    let x_min = arg_or(&args, 2, -1.0_f32, "a number")?;
    let x_max = arg_or(&args, 3, 1.0_f32, "a number")?;
    let y_min = arg_or(&args, 4, -1.0_f32, "a number")?;
    let y_max = arg_or(&args, 5, 1.0_f32, "a number")?;
    if step <= 0.0 {
        return Err(AppError::Argument {
            index: 1,
            value: step.to_string(),
            expected: "a positive step",
        });
    }

    let (mut scene, _) = build_plotter(&config, step, PETALS)?;
    let mut renderer = SceneRenderer::new(scene.layout, scene.binding)
        .with_root_transform(fit_bounds((x_min, y_min), (x_max, y_max)))
        .with_clear_color(config.clear_color);

    let stats = renderer.render_frame(&scene.graph, &mut scene.device, 0.0)?;
    for draw in scene.device.draws() {
        log::info!(
            "{:?} over {} vertices from {}",
            draw.call.mode,
            draw.call.range.count,
            draw.call.range.first
        );
    }
    log::info!("Plotted with {} draw call(s)", stats.draw_calls);
    Ok(())
}
