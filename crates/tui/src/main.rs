mod app;
mod form;
mod player;
mod view;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use gamehub_core::{
    catalog::AnySource,
    config::{self, AppConfig},
    controller::{CatalogController, ControllerOptions},
    store::JsonFileStore,
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::{player::BrowserPlayer, view::TerminalView};

#[tokio::main]
async fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.log_dir())?;
    info!(catalog = %config.catalog, data_dir = %config.data_dir.display(), "Starting game hub");

    let source = AnySource::from_location(config.catalog_location(), config.catalog_timeout())
        .context("failed to prepare catalog source")?;
    let store = JsonFileStore::new(config.store_dir());
    let view = TerminalView::new();
    let (player_tx, player_rx) = mpsc::channel(8);
    let player = BrowserPlayer::new(&config.player, player_tx)?;

    let mut controller = CatalogController::new(
        source,
        store,
        view.clone(),
        player,
        ControllerOptions::from_config(&config),
    );
    let report = controller.load().await;

    let mut app = app::GameHubApp::new(controller, view, report);
    app.attach_player(player_rx);
    app.run().await
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("gamehub.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal owns stdout, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
