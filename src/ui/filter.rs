use eframe::egui::{self, Grid, RichText, Ui};

use crate::data::filter::{ColumnKind, NumericKind};
use crate::state::AppState;
use crate::ui::{panels, table};

/// "Data filtering" section: one column/operator/value condition.
pub fn filter_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔎 Data filtering");
    ui.separator();

    let names = match state.session.dataset() {
        Ok(ds) => ds.column_names(),
        Err(e) => {
            ui.colored_label(egui::Color32::from_rgb(210, 153, 34), format!("⚠ {e}"));
            return;
        }
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            condition_form(ui, state, &names);
            ui.add_space(8.0);
            outcome_view(ui, state);

            ui.separator();
            egui::CollapsingHeader::new("🔗 Multiple conditions (advanced)")
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ui.label("Coming soon: filters combining several conditions with AND/OR.");
                    ui.weak("Combine several filters for more complex analysis.");
                });
        });
}

fn condition_form(ui: &mut Ui, state: &mut AppState, names: &[String]) {
    ui.strong("Filter rows by a condition");

    // The column picker resolves the operator set once per change.
    let mut chosen: Option<String> = None;
    egui::ComboBox::from_id_salt("filter_column")
        .selected_text(&state.filter.column)
        .show_ui(ui, |ui: &mut Ui| {
            for name in names {
                if ui
                    .selectable_label(state.filter.column == *name, name)
                    .clicked()
                {
                    chosen = Some(name.clone());
                }
            }
        });
    if let Some(name) = chosen {
        state.choose_filter_column(&name);
    }

    let Some(target) = &state.filter.target else {
        return;
    };

    ui.columns(3, |cols| {
        // ---- Operator ----
        let current = target
            .operators
            .get(state.filter.operator)
            .map(|op| op.to_string())
            .unwrap_or_default();
        cols[0].label("Operator:");
        egui::ComboBox::from_id_salt("filter_operator")
            .selected_text(current)
            .show_ui(&mut cols[0], |ui: &mut Ui| {
                for (i, op) in target.operators.iter().enumerate() {
                    ui.selectable_value(&mut state.filter.operator, i, op.to_string());
                }
            });

        // ---- Value, typed like the column ----
        cols[1].label("Value:");
        match target.kind {
            ColumnKind::Numeric(NumericKind::Integer) => {
                cols[1].add(egui::DragValue::new(&mut state.filter.int_value));
            }
            ColumnKind::Numeric(NumericKind::Float) => {
                cols[1].add(egui::DragValue::new(&mut state.filter.float_value).speed(0.1));
            }
            ColumnKind::Text => {
                if !target.examples.is_empty() {
                    cols[1].weak(format!("Example values: {}", target.examples.join(", ")));
                }
                cols[1].text_edit_singleline(&mut state.filter.text_value);
            }
        }

        // ---- Column facts ----
        cols[2].label("Column information:");
        let column_type = match target.kind {
            ColumnKind::Numeric(NumericKind::Integer) => "int64",
            ColumnKind::Numeric(NumericKind::Float) => "float64",
            ColumnKind::Text => "object",
        };
        Grid::new("filter_column_info").show(&mut cols[2], |ui: &mut Ui| {
            ui.label("Type:");
            ui.label(column_type);
            ui.end_row();
            ui.label("Unique values:");
            ui.label(target.unique.to_string());
            ui.end_row();
            if let (Some(min), Some(max)) = (&target.min, &target.max) {
                ui.label("Min:");
                ui.label(min.to_string());
                ui.end_row();
                ui.label("Max:");
                ui.label(max.to_string());
                ui.end_row();
            }
        });
    });

    if ui.button("🔍 Apply filter").clicked() {
        state.apply_filter();
    }
}

fn outcome_view(ui: &mut Ui, state: &mut AppState) {
    let Some(outcome) = &state.filter.outcome else {
        return;
    };

    if outcome.is_empty() {
        ui.colored_label(
            egui::Color32::from_rgb(210, 153, 34),
            "⚠ No rows match the given condition",
        );
        return;
    }

    ui.label(format!(
        "✅ Filter applied: {} rows found out of {} total",
        outcome.matched_rows, outcome.original_rows
    ));
    Grid::new("filter_metrics")
        .num_columns(3)
        .spacing([40.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            ui.weak("Original rows");
            ui.weak("Filtered rows");
            ui.weak("Percentage");
            ui.end_row();
            ui.label(RichText::new(outcome.original_rows.to_string()).size(22.0));
            ui.label(RichText::new(outcome.matched_rows.to_string()).size(22.0));
            ui.label(RichText::new(format!("{:.1}%", outcome.match_pct)).size(22.0));
            ui.end_row();
        });

    ui.strong("Filtered data");
    table::dataset_table(ui, "filtered", &outcome.data, 0, state.config.max_table_rows);

    if ui.button("📥 Download filtered data (CSV)").clicked() {
        panels::save_file_dialog(state);
    }
}
