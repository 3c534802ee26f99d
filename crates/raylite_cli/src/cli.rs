use clap::{Parser, ValueEnum};
use log::LevelFilter;
use raylite_renderer::RenderConfig;
use std::path::PathBuf;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments. Flags that are given override the scene file's
/// `render` section, which in turn overrides the defaults.
#[derive(Debug, Parser)]
#[command(name = "raylite")]
#[command(about = "A Whitted-style CPU ray tracer")]
pub struct Args {
    /// Scene description (JSON). Renders the built-in demo scene when omitted.
    pub scene: Option<PathBuf>,

    /// Output image path; the extension picks the format (.png, .ppm, ...)
    #[arg(short, long, default_value = "render.png")]
    pub output: PathBuf,

    /// Maximum reflection/refraction depth
    #[arg(long)]
    pub depth: Option<u32>,

    /// Maximum samples per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Area light sampling grid (N gives N x N shadow rays)
    #[arg(long)]
    pub light_grid: Option<u32>,

    /// Worker threads (defaults to the number of cores)
    #[arg(long, short = 't')]
    pub threads: Option<usize>,

    /// Seed for pixel jitter and light sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Adaptive sampling tolerance; 0 always takes every sample
    #[arg(long)]
    pub tolerance: Option<f32>,

    /// Bucket edge length in pixels
    #[arg(long)]
    pub bucket_size: Option<u32>,

    /// Image width in pixels (overrides the scene camera)
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels (overrides the scene camera)
    #[arg(long)]
    pub height: Option<u32>,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Layer the given flags over `config`.
    pub fn apply(&self, mut config: RenderConfig) -> RenderConfig {
        if let Some(depth) = self.depth {
            config.max_depth = depth;
        }
        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(grid) = self.light_grid {
            config.light_grid_size = grid;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(tolerance) = self.tolerance {
            config.adaptive_tolerance = tolerance;
        }
        if let Some(bucket_size) = self.bucket_size {
            config.bucket_size = bucket_size;
        }
        config
    }
}
