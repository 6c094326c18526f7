use eframe::egui::{self, Grid, Ui};

use crate::data::loader::{Delimiter, TextEncoding};
use crate::state::AppState;
use crate::ui::{panels, table};

/// "Load data" section: pick a file, set parse options, load.
pub fn load_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📂 Load CSV files");
    ui.separator();

    if ui.button("Choose a CSV file…").clicked() {
        panels::open_file_dialog(state);
    }

    let Some(upload) = &state.upload else {
        ui.label("👆 Please choose a CSV file to begin");
        return;
    };
    ui.label(format!("Selected: {} ({} bytes)", upload.name, upload.bytes.len()));
    ui.add_space(6.0);

    Grid::new("parse_options")
        .num_columns(2)
        .spacing([10.0, 8.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Separator:");
            egui::ComboBox::from_id_salt("delimiter")
                .selected_text(state.parse.delimiter.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for d in Delimiter::ALL {
                        ui.selectable_value(&mut state.parse.delimiter, d, d.label());
                    }
                });
            ui.end_row();

            ui.label("Encoding:");
            egui::ComboBox::from_id_salt("encoding")
                .selected_text(state.parse.encoding.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for e in TextEncoding::ALL {
                        ui.selectable_value(&mut state.parse.encoding, e, e.label());
                    }
                });
            ui.end_row();

            ui.label("Header row:");
            ui.horizontal(|ui: &mut Ui| {
                let mut has_header = state.parse.header_row.is_some();
                if ui.checkbox(&mut has_header, "has header").changed() {
                    state.parse.header_row = has_header.then_some(0);
                }
                if let Some(row) = state.parse.header_row.as_mut() {
                    ui.add(egui::DragValue::new(row).range(0..=usize::MAX));
                }
            });
            ui.end_row();

            ui.label("Rows to skip:");
            ui.add(egui::DragValue::new(&mut state.parse.skip_rows).range(0..=usize::MAX));
            ui.end_row();
        });

    ui.add_space(6.0);
    if ui.button("🚀 Load dataset").clicked() {
        state.load_upload();
    }

    if let Some(report) = &state.last_load {
        ui.add_space(8.0);
        ui.label(format!(
            "✅ Dataset loaded: {} rows, {} columns",
            report.rows, report.columns
        ));
        ui.strong("Dataset preview");
        table::dataset_table(ui, "load_preview", &report.preview, 0, state.config.max_table_rows);
    }
}
