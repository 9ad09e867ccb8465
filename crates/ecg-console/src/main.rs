//! ECG Console - interactive front end for the acquisition pipeline

mod app;
mod ui;

use app::ConsoleApp;
use ecg_processing::AcquisitionConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional configuration file as the first argument
    let config = match std::env::args().nth(1) {
        Some(path) => AcquisitionConfig::load(Path::new(&path))?,
        None => AcquisitionConfig::default(),
    };

    let mut app = ConsoleApp::new(config)?;
    app.run().await
}
