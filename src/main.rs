mod app;
mod config;
mod data;
mod error;
mod state;
mod ui;

use app::CsvLensApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::discover();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "CSV Lens – Dataset Analyzer",
        options,
        Box::new(|_cc| Ok(Box::new(CsvLensApp::new(config)))),
    )
}
