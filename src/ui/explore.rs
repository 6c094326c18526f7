use eframe::egui::{self, Grid, RichText, Ui};

use crate::data::inspect::{self, NumericSummary, Window};
use crate::state::{AppState, ExploreTab, ExploreViews};
use crate::ui::table::{self, fmt_stat};

/// "Basic exploration" section: head/tail, info, statistics, structure.
pub fn explore_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Basic dataset exploration");
    ui.separator();

    let rows = match state.session.dataset() {
        Ok(ds) => ds.num_rows(),
        Err(e) => {
            ui.colored_label(egui::Color32::from_rgb(210, 153, 34), format!("⚠ {e}"));
            return;
        }
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(&mut state.explore_tab, ExploreTab::Rows, "📝 First/last rows");
        ui.selectable_value(&mut state.explore_tab, ExploreTab::Info, "📋 Basic info");
        ui.selectable_value(&mut state.explore_tab, ExploreTab::Statistics, "📊 Statistics");
        ui.selectable_value(&mut state.explore_tab, ExploreTab::Structure, "🏗 Structure");
    });
    ui.separator();

    let tab = state.explore_tab;
    match tab {
        ExploreTab::Rows => rows_tab(ui, state, rows),
        _ => match &state.views {
            Some(views) => match tab {
                ExploreTab::Info => info_tab(ui, views),
                ExploreTab::Statistics => statistics_tab(ui, views),
                _ => structure_tab(ui, views),
            },
            None => {
                ui.label("Summaries are unavailable for this dataset.");
            }
        },
    }
}

fn rows_tab(ui: &mut Ui, state: &mut AppState, rows: usize) {
    let max_rows = state.config.max_table_rows;
    let max_n = rows.max(1);

    ui.columns(2, |cols| {
        cols[0].strong("First N rows:");
        cols[0].add(egui::DragValue::new(&mut state.head_rows).range(1..=max_n));
        match inspect::row_window(&state.session, Window::Head(state.head_rows)) {
            Ok(head) => table::dataset_table(&mut cols[0], "head", &head, 0, max_rows),
            Err(e) => {
                cols[0].label(e.to_string());
            }
        }

        cols[1].strong("Last N rows:");
        cols[1].add(egui::DragValue::new(&mut state.tail_rows).range(1..=max_n));
        match inspect::row_window(&state.session, Window::Tail(state.tail_rows)) {
            Ok(tail) => {
                let first = rows - tail.num_rows();
                table::dataset_table(&mut cols[1], "tail", &tail, first, max_rows);
            }
            Err(e) => {
                cols[1].label(e.to_string());
            }
        }
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.weak(label);
        ui.label(RichText::new(value).size(22.0));
    });
}

fn info_tab(ui: &mut Ui, views: &ExploreViews) {
    ui.strong("General dataset information");
    let m = &views.metrics;
    Grid::new("metrics")
        .num_columns(3)
        .spacing([40.0, 12.0])
        .show(ui, |ui: &mut Ui| {
            metric(ui, "Rows", m.rows.to_string());
            metric(ui, "Total cells", m.cells.to_string());
            metric(ui, "Memory usage", format!("{:.2} MB", m.memory_mb));
            ui.end_row();
            metric(ui, "Columns", m.columns.to_string());
            metric(ui, "Null values", m.nulls.to_string());
            metric(ui, "Duplicates", m.duplicates.to_string());
            ui.end_row();
        });

    ui.add_space(10.0);
    ui.strong("Data types per column");
    let rows: Vec<Vec<String>> = views
        .schema
        .iter()
        .map(|c| {
            vec![
                c.name.clone(),
                c.column_type.to_string(),
                c.non_null.to_string(),
                c.nulls.to_string(),
                format!("{:.2}", c.null_pct),
            ]
        })
        .collect();
    table::text_table(
        ui,
        "schema",
        &["Column", "Data type", "Non-null", "Null", "% Null"],
        &rows,
    );
}

fn statistics_tab(ui: &mut Ui, views: &ExploreViews) {
    ui.strong("Descriptive statistics");
    match &views.numeric {
        NumericSummary::NoNumericColumns => {
            ui.label("No numeric columns found for statistical analysis");
        }
        NumericSummary::Columns(cols) => {
            ui.label("Statistics for numeric columns:");
            let rows: Vec<Vec<String>> = cols
                .iter()
                .map(|s| {
                    vec![
                        s.column.clone(),
                        s.count.to_string(),
                        fmt_stat(s.mean),
                        fmt_stat(s.std),
                        fmt_stat(s.min),
                        fmt_stat(s.q25),
                        fmt_stat(s.q50),
                        fmt_stat(s.q75),
                        fmt_stat(s.max),
                    ]
                })
                .collect();
            table::text_table(
                ui,
                "describe",
                &["Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"],
                &rows,
            );
        }
    }

    if !views.categorical.is_empty() {
        ui.add_space(10.0);
        ui.label("Information for categorical columns:");
        let rows: Vec<Vec<String>> = views
            .categorical
            .iter()
            .map(|c| {
                vec![
                    c.column.clone(),
                    c.unique.to_string(),
                    c.top.clone(),
                    c.freq.to_string(),
                ]
            })
            .collect();
        table::text_table(
            ui,
            "categorical",
            &["Column", "Unique values", "Most frequent", "Max frequency"],
            &rows,
        );
    }
}

fn structure_tab(ui: &mut Ui, views: &ExploreViews) {
    let st = &views.structure;
    ui.columns(2, |cols| {
        cols[0].strong("Column list:");
        let rows: Vec<Vec<String>> = st
            .columns
            .iter()
            .map(|(i, name, t)| vec![i.to_string(), name.clone(), t.to_string()])
            .collect();
        table::text_table(&mut cols[0], "structure", &["Index", "Column name", "Type"], &rows);

        cols[1].strong("Dataset shape:");
        cols[1].label(format!("Dimensions: ({}, {})", st.rows, st.cols));
        cols[1].label(format!("Rows: {}", st.rows));
        cols[1].label(format!("Columns: {}", st.cols));
        cols[1].add_space(6.0);
        cols[1].strong("Data type summary:");
        for (t, count) in &st.type_counts {
            cols[1].label(format!("- {t}: {count} columns"));
        }
    });
}
