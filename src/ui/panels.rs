use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Section, StatusKind};

// ---------------------------------------------------------------------------
// Left side panel – section menu
// ---------------------------------------------------------------------------

/// Render the left navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔧 Tools");
    ui.separator();

    ui.label("Choose a function:");
    for section in Section::ALL {
        ui.selectable_value(&mut state.section, section, section.label());
    }
    ui.separator();

    match state.session.dataset() {
        Ok(ds) => {
            ui.strong("Current dataset");
            if let Some(name) = &state.loaded_name {
                ui.label(name);
            }
            ui.label(format!("{} rows × {} columns", ds.num_rows(), ds.num_columns()));
        }
        Err(_) => {
            ui.label("No dataset loaded.");
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(status) = &state.status {
            let color = match status.kind {
                StatusKind::Success => Color32::from_rgb(46, 160, 67),
                StatusKind::Info => Color32::LIGHT_BLUE,
                StatusKind::Warning => Color32::from_rgb(210, 153, 34),
                StatusKind::Error => Color32::RED,
            };
            ui.label(RichText::new(&status.text).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

/// Pick a CSV file and keep its bytes as the pending upload.
pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Select a CSV file")
        .add_filter("CSV", &["csv"])
        .add_filter("All files", &["*"])
        .pick_file();

    if let Some(path) = file {
        match std::fs::read(&path) {
            Ok(bytes) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                state.pick_upload(name, bytes);
            }
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                state.report_error(&crate::error::ExploreError::Parse(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        }
    }
}

/// Ask where to save the filtered rows, then write them.
pub fn save_file_dialog(state: &mut AppState) {
    let Some(outcome) = &state.filter.outcome else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(outcome.export_file_name())
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.save_export(&path);
    }
}
