mod app;
mod colors;
mod requirements;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON file with the requirement listing.
    #[arg(default_value = "requirements.json")]
    input: PathBuf,

    /// Seed for palette picks, for reproducible tag colors.
    #[arg(long)]
    palette_seed: Option<u64>,

    #[arg(long, default_value_t = 0.1)]
    min_zoom: f32,

    #[arg(long, default_value_t = 4.0)]
    max_zoom: f32,

    /// Tracing filter, overridden by RUST_LOG.
    #[arg(long, default_value = "info")]
    log: String,
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);

    let settings = app::Settings {
        input_path: args.input,
        palette_seed: args.palette_seed,
        min_zoom: args.min_zoom,
        max_zoom: args.max_zoom,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Requirement Graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::RequirementGraphApp::new(cc, settings)))),
    )
}
