mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;
mod views;

use std::path::PathBuf;

use anyhow::anyhow;
use app::ReelPandaApp;
use clap::Parser;
use config::DashboardConfig;
use eframe::egui;
use state::AppState;

/// Interactive movie rating dashboard.
#[derive(Debug, Parser)]
#[command(name = "reel-panda", version, about)]
struct Args {
    /// Dataset to open at startup (.csv, .xls, .tsv, .json, .parquet).
    data: Option<PathBuf>,

    /// Dashboard config (TOML). Defaults to ./reel-panda.toml when present.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = DashboardConfig::load(args.config.as_deref())?;
    let mut state = AppState::new(config);
    if let Some(path) = &args.data {
        state.load_path(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Reel Panda – Movie Dashboard",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(ReelPandaApp::new(state)))
        }),
    )
    .map_err(|e| anyhow!("{e}"))
}
