/// scop terminal viewer - render an OBJ model as ASCII art
///
/// Controls:
///   - F: Toggle focus / free camera
///   - Focus: +/- spin speed, Space reset
///   - Free: WASD move, Q/E down/up, Arrow Keys look
///   - T: Cycle render mode, Z/X or mouse wheel: zoom, R: reload
///   - ESC: Quit

use anyhow::Context;
use clap::Parser;
use scop_core::colors::DEFAULT_SEED;
use scop_core::transform::DEFAULT_DESIRED_SIZE;
use scop_core::viewer::DEFAULT_TEXTURE;
use scop_core::{Model, Normalization, Viewer, ViewerConfig};
use scop_terminal::TerminalApp;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scop-terminal", version, about = "Render an OBJ model in the terminal")]
struct Args {
    /// OBJ file to display; a cube is shown when omitted
    model: Option<PathBuf>,

    /// Texture name recorded for the model
    #[arg(long, default_value = DEFAULT_TEXTURE)]
    texture: String,

    /// Seed for the per-face colors
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Size of the largest model dimension on screen
    #[arg(long, default_value_t = DEFAULT_DESIRED_SIZE)]
    size: f32,

    /// Only center the model, keep its original scale
    #[arg(long)]
    center_only: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = ViewerConfig {
        normalization: if args.center_only {
            Normalization::CenterOnly
        } else {
            Normalization::UniformScale {
                desired_size: args.size,
            }
        },
        color_seed: args.seed,
        texture_name: args.texture,
        ..ViewerConfig::default()
    };

    let viewer = match &args.model {
        Some(path) => {
            println!("Loading OBJ file: {}", path.display());
            Viewer::open(path, config)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => {
            println!("No OBJ file provided, using default cube...");
            Viewer::new(Model::cube(2.0), config)
        }
    };

    println!(
        "Loaded {} vertices, {} faces (texture: {})",
        viewer.model().vertices.len(),
        viewer.model().faces.len(),
        viewer.model().texture_name
    );
    println!("Starting terminal renderer (press Esc to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    // Run the terminal app
    let mut app = TerminalApp::new(viewer)?;
    app.run()?;

    println!("Thank you for using the scop terminal viewer!");
    Ok(())
}
