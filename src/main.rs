mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use app::AnalystBoardApp;
use config::DashboardConfig;
use data::cache::TableCache;
use data::loader::{FileSource, HttpSource, TableSource};
use eframe::egui;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let cwd = std::env::current_dir().context("resolving working directory")?;
    let config = DashboardConfig::load_or_default(&cwd)?;

    let source: Box<dyn TableSource> = match &config.csv_path {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(HttpSource::new(config.csv_url()?, config.request_timeout())?),
    };
    log::info!(
        "Reading {} (cache TTL {:?})",
        source.describe(),
        config.cache_ttl()
    );
    let cache = TableCache::new(source, config.cache_ttl());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let title = config.title.clone();
    let state = AppState::new(config, cache);
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(AnalystBoardApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
