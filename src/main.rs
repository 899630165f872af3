mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::Context;
use app::CitationExplorerApp;
use clap::Parser;
use eframe::egui;

use config::Args;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let state = AppState::from_args(&args).context("startup data could not be loaded")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Citation Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(CitationExplorerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
