use eframe::egui;

use crate::config::AppConfig;
use crate::state::{AppState, Section};
use crate::ui::{explore, filter, load, panels, select};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CsvLensApp {
    pub state: AppState,
}

impl CsvLensApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for CsvLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: section menu ----
        egui::SidePanel::left("section_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active section ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.section {
            Section::Load => load::load_section(ui, &mut self.state),
            Section::Explore => explore::explore_section(ui, &mut self.state),
            Section::Select => select::select_section(ui, &mut self.state),
            Section::Filter => filter::filter_section(ui, &mut self.state),
        });
    }
}
