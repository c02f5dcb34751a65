use anyhow::{Context, Result};
use chaos_viewer::config::Config;
use clap::Parser;
use std::fs::File;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;

fn main() -> Result<()> {
    let cfg = Config::parse();
    init_logging(&cfg)?;

    if cfg.list_devices {
        chaos_viewer::audio::list_input_devices()?;
        return Ok(());
    }

    chaos_viewer::app::run(cfg)
}

/// The alternate screen owns stdout, so logs go to a file when asked and
/// otherwise only errors reach stderr.
fn init_logging(cfg: &Config) -> Result<()> {
    match &cfg.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_max_level(cfg.log_level.as_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_max_level(LevelFilter::ERROR)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
