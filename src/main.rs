use anyhow::{anyhow, Result};
use eframe::egui::ViewportBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod controller;
mod debounce;
mod detail;
mod error;
mod hn_client;
mod html;
mod models;
mod pagination;
mod theme;
mod worker;

use crate::app::SearchApp;
use crate::config::Config;
use crate::hn_client::HackerNewsClient;
use crate::worker::Worker;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hn_search=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    init_logging();

    let config = Config::default();
    let client = HackerNewsClient::new(&config)?;
    let worker = Worker::new(client)?;
    info!(api = %config.api_base_url, "starting");

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1000.0, 800.0])
            .with_min_inner_size([600.0, 480.0])
            .with_title("Search Hacker News"),
        ..Default::default()
    };

    eframe::run_native(
        "Search Hacker News",
        options,
        Box::new(move |cc| {
            let worker = worker.with_repaint(cc.egui_ctx.clone());
            Ok(Box::new(SearchApp::new(config, worker)))
        }),
    )
    .map_err(|e| anyhow!("window loop failed: {}", e))
}
