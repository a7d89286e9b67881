//! pointfield
//!
//! Seeds a GPU n-body particle field from an XYZ point cloud and lets the
//! user orbit around it while it evolves.

mod app;
mod config;
mod errors;

use clap::Parser;
use config::{Overrides, ViewerConfig};
use errors::AppError;
use std::path::PathBuf;
use tracing::{error, info};

/// Interactive particle field seeded from an XYZ point cloud
#[derive(Parser, Debug)]
#[command(name = "pointfield")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// XYZ file to load (comma-separated points, frames split by "XYZ")
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Choose the XYZ file with a file dialog
    #[arg(long, conflicts_with = "file")]
    pick: bool,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of particles
    #[arg(short = 'n', long)]
    particles: Option<usize>,

    /// Gravitational softening length
    #[arg(long)]
    softening: Option<f32>,

    /// Integration step while the simulation runs
    #[arg(long)]
    delta: Option<f32>,

    /// Sprite diameter in pixels
    #[arg(long)]
    point_size: Option<f32>,

    /// Frame to seed from (defaults to the first non-empty frame)
    #[arg(long)]
    frame: Option<usize>,

    /// Start with the simulation running
    #[arg(long)]
    running: bool,
}

fn pick_model() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("XYZ Files", &["xyz", "txt"])
        .add_filter("All Files", &["*"])
        .pick_file()
}

fn resolve_config(args: Args) -> Result<ViewerConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };

    let model = if args.pick {
        let picked = pick_model();
        if picked.is_none() {
            info!("No file picked, falling back to configured model");
        }
        picked
    } else {
        args.file
    };

    config.apply(Overrides {
        model,
        frame: args.frame,
        particles: args.particles,
        softening: args.softening,
        delta: args.delta,
        point_size: args.point_size,
        running: args.running,
    });
    Ok(config)
}

fn main() {
    pointfield_window::init_tracing();

    let args = Args::parse();
    let result = resolve_config(args).and_then(app::run);
    if let Err(e) = result {
        error!("Application error: {e}");
        std::process::exit(1);
    }
}
