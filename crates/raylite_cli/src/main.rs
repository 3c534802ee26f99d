mod cli;
mod demo;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use raylite_core::{load_scene_file, TextureCache};
use raylite_renderer::{render, RenderConfig, SceneBuilder};
use std::time::Instant;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting raylite");

    let (mut builder, file_config) = match &args.scene {
        Some(path) => {
            let desc = load_scene_file(path)
                .with_context(|| format!("Failed to load scene {}", path.display()))?;
            let config = match &desc.render {
                Some(section) => serde_json::from_value(section.clone())
                    .context("Invalid \"render\" section in scene file")?,
                None => RenderConfig::default(),
            };
            let mut textures = match &desc.base_dir {
                Some(dir) => TextureCache::with_base_dir(dir),
                None => TextureCache::new(),
            };
            let builder = SceneBuilder::from_description(&desc, &mut textures)
                .context("Failed to build scene")?;
            log::debug!("Loaded {} textures", textures.len());
            (builder, config)
        }
        None => {
            log::info!("No scene file given, rendering the demo scene");
            (demo::demo_scene(), RenderConfig::default())
        }
    };

    if args.width.is_some() || args.height.is_some() {
        let (width, height) = builder.resolution();
        builder = builder.with_resolution(
            args.width.unwrap_or(width),
            args.height.unwrap_or(height),
        );
    }

    let config = args.apply(file_config);
    let scene = builder.with_max_leaf_size(config.max_leaf_size).build();

    let start = Instant::now();
    render(&scene, &args.output, &config)
        .with_context(|| format!("Failed to render {}", args.output.display()))?;
    log::info!(
        "Done in {:.2?}: {}",
        start.elapsed(),
        args.output.display()
    );

    Ok(())
}
