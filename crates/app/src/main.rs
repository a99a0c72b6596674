//! softscene - Main Entry Point
//!
//! Renders a small 3D scene entirely on the CPU and shows it in a window.
//!
//! Controls: WASD pan, Q/E zoom out/in, arrows rotate, R resets the camera,
//! Escape quits.
//!
//! Usage: `softscene [scene.toml]`. Without an argument the built-in scene is used.

mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use softscene_platform::Window;

use crate::config::SceneConfig;

fn main() -> Result<()> {
    // Initialize logging
    softscene_core::init_logging();
    info!("Starting softscene");

    let (config, base_dir) = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => {
            info!("Loading scene from {}", path.display());
            let config: SceneConfig = softscene_core::load_toml(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let base_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();
            (config, base_dir)
        }
        None => {
            info!("No scene file given, using the built-in scene");
            (SceneConfig::default(), PathBuf::from("."))
        }
    };

    let mut scene = config.build_scene(&base_dir)?;

    let mut window = Window::new(
        &config.window.title,
        config.window.width,
        config.window.height,
    )?;
    window.set_target_fps(config.window.target_fps);

    scene.run(&mut window)?;

    info!("Shutting down");
    Ok(())
}
