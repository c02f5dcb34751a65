use crate::engine::EngineConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "chaos-viewer", version, about = "Real-time chaos visuals in the terminal")]
pub struct Config {
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    /// Kaleidoscope wedge count (1-9). Overrides the saved value.
    #[arg(long)]
    pub segments: Option<u32>,

    /// Fractal subdivision depth (1-7). Overrides the saved value.
    #[arg(long)]
    pub fractal_depth: Option<u32>,

    #[arg(long, default_value_t = 1000)]
    pub particle_cap: usize,

    #[arg(long, default_value_t = 24)]
    pub voronoi_seeds: usize,

    /// Voronoi sampling block size in pixels.
    #[arg(long, default_value_t = 6)]
    pub voronoi_cell: usize,

    /// Attractor trail length in points.
    #[arg(long, default_value_t = 1000)]
    pub trail: usize,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub no_audio: bool,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "ansi", alias = "text")]
    Ascii,
}

impl RendererMode {
    /// Canvas pixels per terminal cell (columns, rows).
    pub fn pixels_per_cell(self) -> (usize, usize) {
        match self {
            Self::HalfBlock => (1, 2),
            Self::Ascii => (1, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

impl Config {
    /// Engine settings for a `width` x `height` canvas. Runtime values
    /// (segments, depth) come from the caller so they survive a resize.
    pub fn to_engine_config(&self, width: usize, height: usize, segments: u32, fractal_depth: u32) -> EngineConfig {
        EngineConfig {
            width,
            height,
            segments,
            fractal_depth,
            particle_cap: self.particle_cap,
            voronoi_seeds: self.voronoi_seeds,
            voronoi_cell: self.voronoi_cell,
            trail_len: self.trail,
            seed: self.seed,
        }
        .sanitized()
    }
}
