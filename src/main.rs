//! Data Visualizer - CSV upload and statistical chart viewer
//!
//! Load a CSV, pick columns, a chart kind and a style, and render the figure.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use config::VisualizerConfig;
use eframe::egui;
use gui::DataVisualizerApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = VisualizerConfig::load_or_default();
    tracing::info!(?config.window_size, "starting data visualizer");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([900.0, 600.0])
            .with_title("Data Visualizer")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Data Visualizer",
        options,
        Box::new(move |cc| Ok(Box::new(DataVisualizerApp::new(cc, config)))),
    )
}
