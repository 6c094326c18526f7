use std::hash::Hash;

use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{CellValue, Dataset};

const ROW_HEIGHT: f32 = 18.0;
const MAX_HEIGHT: f32 = 320.0;

/// Render a dataset with its row positions in the leading column, starting at `first_row`.
pub fn dataset_table(ui: &mut Ui, id: impl Hash, ds: &Dataset, first_row: usize, max_rows: usize) {
    render_dataset(ui, id, ds, max_rows, |r| (first_row + r).to_string());
}

/// Render a dataset whose rows came from explicit positions.
pub fn picked_table(
    ui: &mut Ui,
    id: impl Hash,
    ds: &Dataset,
    positions: &[usize],
    max_rows: usize,
) {
    render_dataset(ui, id, ds, max_rows, |r| {
        positions.get(r).map(|p| p.to_string()).unwrap_or_default()
    });
}

fn render_dataset(
    ui: &mut Ui,
    id: impl Hash,
    ds: &Dataset,
    max_rows: usize,
    row_label: impl Fn(usize) -> String,
) {
    let names = ds.column_names();
    let shown = ds.num_rows().min(max_rows);

    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(MAX_HEIGHT)
                .column(Column::auto().at_least(32.0))
                .columns(Column::auto().at_least(60.0), names.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("");
                    });
                    for name in &names {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, shown, |mut row| {
                        let r = row.index();
                        row.col(|ui| {
                            ui.weak(row_label(r));
                        });
                        for c in 0..names.len() {
                            row.col(|ui| {
                                cell_label(ui, &ds.cell(r, c));
                            });
                        }
                    });
                });
        });
    });

    if ds.num_rows() > shown {
        ui.weak(format!("Showing {shown} of {} rows", ds.num_rows()));
    }
}

/// Plain text table for summaries (schema, describe, ...).
pub fn text_table(ui: &mut Ui, id: impl Hash, headers: &[&str], rows: &[Vec<String>]) {
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(MAX_HEIGHT)
                .columns(Column::auto().at_least(60.0), headers.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    for h in headers {
                        header.col(|ui| {
                            ui.strong(*h);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let cells = &rows[row.index()];
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
    });
}

fn cell_label(ui: &mut Ui, value: &CellValue) {
    match value {
        CellValue::Null => {
            ui.label(RichText::new("None").weak().italics());
        }
        other => {
            ui.label(other.to_string());
        }
    }
}

/// Six-decimal statistic, or "NaN" when it is undefined.
pub fn fmt_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.6}"),
        None => "NaN".to_string(),
    }
}
