use eframe::egui::{self, Ui};

use crate::state::{AppState, SelectTab};
use crate::ui::table;

/// "Data selection" section: columns and rows.
pub fn select_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🎯 Data selection");
    ui.separator();

    let (names, rows) = match state.session.dataset() {
        Ok(ds) => (ds.column_names(), ds.num_rows()),
        Err(e) => {
            ui.colored_label(egui::Color32::from_rgb(210, 153, 34), format!("⚠ {e}"));
            return;
        }
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.select.tab, SelectTab::Columns, "📋 Select columns");
        ui.selectable_value(&mut state.select.tab, SelectTab::Rows, "🔢 Select rows");
    });
    ui.separator();

    let tab = state.select.tab;
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match tab {
            SelectTab::Columns => columns_tab(ui, state, &names),
            SelectTab::Rows => rows_tab(ui, state, rows),
        });
}

fn columns_tab(ui: &mut Ui, state: &mut AppState, names: &[String]) {
    let max_rows = state.config.max_table_rows;

    // ---- Single column ----
    ui.strong("Select one column:");
    egui::ComboBox::from_id_salt("single_column")
        .selected_text(&state.select.single_column)
        .show_ui(ui, |ui: &mut Ui| {
            for name in names {
                ui.selectable_value(&mut state.select.single_column, name.clone(), name);
            }
        });
    if ui.button("Show selected column").clicked() {
        state.show_column();
    }

    if let Some(detail) = &state.select.detail {
        ui.strong(format!("Column: {}", detail.name));
        ui.columns(2, |cols| {
            cols[0].label("First values:");
            for (i, value) in detail.sample.iter().enumerate() {
                cols[0].monospace(format!("{i:>4}  {value}"));
            }

            cols[1].label("Column information:");
            cols[1].label(format!("- Data type: {}", detail.column_type));
            cols[1].label(format!("- Unique values: {}", detail.unique));
            cols[1].label(format!("- Null values: {}", detail.nulls));
            if let Some(mean) = detail.mean {
                cols[1].label(format!("- Mean: {mean:.2}"));
            }
            if let Some(median) = detail.median {
                cols[1].label(format!("- Median: {median:.2}"));
            }
        });
    }

    ui.separator();

    // ---- Multiple columns ----
    ui.strong("Select multiple columns:");
    let mut toggled: Option<String> = None;
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for name in names {
            let mut checked = state.select.multi_columns.contains(name);
            if ui.checkbox(&mut checked, name).changed() {
                toggled = Some(name.clone());
            }
        }
    });
    if let Some(name) = toggled {
        state.toggle_multi_column(&name);
    }
    ui.label(format!("Picked: {}", state.select.multi_columns.join(", ")));

    let enabled = !state.select.multi_columns.is_empty();
    if ui
        .add_enabled(enabled, egui::Button::new("Show selected columns"))
        .clicked()
    {
        state.show_projection();
    }

    if let Some(projection) = &state.select.projection {
        ui.strong(format!("Selected columns: {}", projection.data.column_names().join(", ")));
        table::dataset_table(ui, "projection", &projection.data, 0, max_rows);

        ui.label("Information about the selected columns:");
        let rows: Vec<Vec<String>> = projection
            .columns
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    c.column_type.to_string(),
                    c.non_null.to_string(),
                    c.unique.to_string(),
                ]
            })
            .collect();
        table::text_table(ui, "projection_info", &["Column", "Type", "Non-null", "Unique"], &rows);
    }
}

fn rows_tab(ui: &mut Ui, state: &mut AppState, rows: usize) {
    let max_rows = state.config.max_table_rows;
    let last = rows.saturating_sub(1);

    // ---- Range ----
    ui.strong("Select a row range:");
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Start row:");
        ui.add(egui::DragValue::new(&mut state.select.range_start).range(0..=last));
        let min_end = (state.select.range_start + 1).min(rows);
        ui.label("End row:");
        ui.add(egui::DragValue::new(&mut state.select.range_end).range(min_end..=rows));
    });
    if ui.button("Show row range").clicked() {
        state.show_range();
    }
    if let Some((start, end, data)) = &state.select.range {
        ui.strong(format!("Rows {start} to {}:", end - 1));
        table::dataset_table(ui, "range", data, *start, max_rows);
    }

    ui.separator();

    // ---- Explicit indices ----
    ui.strong("Select specific rows:");
    ui.add(
        egui::TextEdit::singleline(&mut state.select.indices_text)
            .hint_text("0,5,10,15"),
    );
    let enabled = !state.select.indices_text.trim().is_empty();
    if ui
        .add_enabled(enabled, egui::Button::new("Show specific rows"))
        .clicked()
    {
        state.show_indices();
    }
    if let Some(pick) = &state.select.picked {
        ui.strong(format!("Rows with indices: {:?}", pick.indices));
        table::picked_table(ui, "picked", &pick.data, &pick.indices, max_rows);
    }
}
