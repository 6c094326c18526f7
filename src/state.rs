use std::path::Path;

use anyhow::Context;

use crate::config::AppConfig;
use crate::data::filter::{self, ColumnKind, FilterOutcome, FilterTarget, FilterValue, NumericKind};
use crate::data::inspect::{
    self, CategoricalSummary, ColumnSchema, DatasetMetrics, NumericSummary, Structure,
};
use crate::data::loader::ParseOptions;
use crate::data::model::Dataset;
use crate::data::select::{self, ColumnDetail, Projection, RowPick};
use crate::data::session::{LoadReport, Session};
use crate::error::{ExploreError, Result};

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

/// Entries of the side menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    Load,
    Explore,
    Select,
    Filter,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Load,
        Section::Explore,
        Section::Select,
        Section::Filter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Load => "📂 Load data",
            Section::Explore => "🔍 Basic exploration",
            Section::Select => "🎯 Data selection",
            Section::Filter => "🔎 Data filtering",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExploreTab {
    #[default]
    Rows,
    Info,
    Statistics,
    Structure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectTab {
    #[default]
    Columns,
    Rows,
}

// ---------------------------------------------------------------------------
// Status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Per-section state
// ---------------------------------------------------------------------------

/// A picked file waiting to be parsed.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Summaries computed once per load; they only change when the dataset does.
#[derive(Debug, Clone)]
pub struct ExploreViews {
    pub metrics: DatasetMetrics,
    pub schema: Vec<ColumnSchema>,
    pub numeric: NumericSummary,
    pub categorical: Vec<CategoricalSummary>,
    pub structure: Structure,
}

#[derive(Debug, Default)]
pub struct SelectState {
    pub tab: SelectTab,
    pub single_column: String,
    pub detail: Option<ColumnDetail>,
    pub multi_columns: Vec<String>,
    pub projection: Option<Projection>,
    pub range_start: usize,
    pub range_end: usize,
    pub range: Option<(usize, usize, Dataset)>,
    pub indices_text: String,
    pub picked: Option<RowPick>,
}

#[derive(Debug, Default)]
pub struct FilterState {
    pub column: String,
    pub target: Option<FilterTarget>,
    /// Position in `target.operators`.
    pub operator: usize,
    pub int_value: i64,
    pub float_value: f64,
    pub text_value: String,
    pub outcome: Option<FilterOutcome>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// The dataset slot; only `load_upload` writes to it.
    pub session: Session,

    pub section: Section,

    /// Outcome of the last action, shown in the top bar.
    pub status: Option<Status>,

    // -- load --
    pub upload: Option<Upload>,
    /// Name of the file behind the current dataset; set only by a successful load.
    pub loaded_name: Option<String>,
    pub parse: ParseOptions,
    pub last_load: Option<LoadReport>,

    // -- explore --
    pub explore_tab: ExploreTab,
    pub head_rows: usize,
    pub tail_rows: usize,
    pub views: Option<ExploreViews>,

    pub select: SelectState,
    pub filter: FilterState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            parse: config.parse.clone(),
            head_rows: config.window_rows,
            tail_rows: config.window_rows,
            config,
            session: Session::new(),
            section: Section::default(),
            status: None,
            upload: None,
            loaded_name: None,
            last_load: None,
            explore_tab: ExploreTab::default(),
            views: None,
            select: SelectState::default(),
            filter: FilterState::default(),
        }
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(Status {
            kind,
            text: text.into(),
        });
    }

    /// Show the error in the status line; warnings for "nothing loaded yet".
    pub fn report_error(&mut self, err: &ExploreError) {
        let kind = match err {
            ExploreError::NoDataset => StatusKind::Warning,
            _ => StatusKind::Error,
        };
        self.set_status(kind, err.to_string());
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// Keep a picked file until the user presses "Load".
    pub fn pick_upload(&mut self, name: String, bytes: Vec<u8>) {
        log::info!("Picked {name} ({} bytes)", bytes.len());
        self.upload = Some(Upload { name, bytes });
        self.last_load = None;
        self.section = Section::Load;
        self.status = None;
    }

    /// Parse the picked file with the current options.
    pub fn load_upload(&mut self) {
        let Some(upload) = &self.upload else {
            self.set_status(StatusKind::Info, "Please choose a CSV file to begin");
            return;
        };
        match self
            .session
            .load(&upload.bytes, &self.parse, self.config.preview_rows)
        {
            Ok(report) => {
                self.loaded_name = Some(upload.name.clone());
                let text = format!(
                    "✅ Dataset loaded: {} rows, {} columns",
                    report.rows, report.columns
                );
                self.last_load = Some(report);
                self.reset_views();
                self.set_status(StatusKind::Success, text);
            }
            Err(e) => {
                self.last_load = None;
                self.report_error(&e);
            }
        }
    }

    /// Recompute cached summaries and re-seed every selector for the new dataset.
    fn reset_views(&mut self) {
        self.views = match self.compute_views() {
            Ok(views) => Some(views),
            Err(e) => {
                log::warn!("Could not summarise dataset: {e}");
                None
            }
        };

        let Ok(ds) = self.session.dataset() else {
            return;
        };
        let names = ds.column_names();
        let rows = ds.num_rows();

        self.head_rows = self.config.window_rows.clamp(1, rows.max(1));
        self.tail_rows = self.head_rows;

        self.select = SelectState {
            single_column: names.first().cloned().unwrap_or_default(),
            multi_columns: select::default_columns(ds),
            range_start: 0,
            range_end: rows.min(10),
            ..SelectState::default()
        };

        self.filter = FilterState::default();
        if let Some(first) = names.first() {
            self.choose_filter_column(first);
        }
    }

    fn compute_views(&self) -> Result<ExploreViews> {
        Ok(ExploreViews {
            metrics: inspect::metrics(&self.session)?,
            schema: inspect::schema(&self.session)?,
            numeric: inspect::numeric_summary(&self.session)?,
            categorical: inspect::categorical_summary(&self.session)?,
            structure: inspect::structure(&self.session)?,
        })
    }

    // -----------------------------------------------------------------------
    // Select
    // -----------------------------------------------------------------------

    pub fn show_column(&mut self) {
        let result = select::column_detail(
            &self.session,
            &self.select.single_column,
            self.config.column_sample,
        );
        match result {
            Ok(detail) => self.select.detail = Some(detail),
            Err(e) => self.report_error(&e),
        }
    }

    /// Toggle a column in the multi-select, keeping pick order.
    pub fn toggle_multi_column(&mut self, name: &str) {
        let cols = &mut self.select.multi_columns;
        if let Some(pos) = cols.iter().position(|c| c == name) {
            cols.remove(pos);
        } else {
            cols.push(name.to_string());
        }
    }

    pub fn show_projection(&mut self) {
        match select::project(&self.session, &self.select.multi_columns) {
            Ok(p) => self.select.projection = Some(p),
            Err(e) => self.report_error(&e),
        }
    }

    pub fn show_range(&mut self) {
        let (start, end) = (self.select.range_start, self.select.range_end);
        match select::row_range(&self.session, start, end) {
            Ok(rows) => self.select.range = Some((start, end, rows)),
            Err(e) => self.report_error(&e),
        }
    }

    pub fn show_indices(&mut self) {
        match select::rows_at(&self.session, &self.select.indices_text) {
            Ok(pick) => self.select.picked = Some(pick),
            Err(e) => {
                self.select.picked = None;
                self.report_error(&e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Filter
    // -----------------------------------------------------------------------

    /// Resolve the chosen column once: operator set, default value, column facts.
    pub fn choose_filter_column(&mut self, name: &str) {
        let target = match self
            .session
            .dataset()
            .and_then(|ds| FilterTarget::resolve(ds, name))
        {
            Ok(t) => t,
            Err(e) => {
                self.report_error(&e);
                return;
            }
        };

        self.filter.column = name.to_string();
        self.filter.operator = 0;
        self.filter.outcome = None;
        match &target.default_value {
            FilterValue::Integer(v) => self.filter.int_value = *v,
            FilterValue::Float(v) => self.filter.float_value = *v,
            FilterValue::Text(v) => self.filter.text_value = v.clone(),
        }
        self.filter.target = Some(target);
    }

    pub fn apply_filter(&mut self) {
        let Some(target) = &self.filter.target else {
            self.set_status(StatusKind::Warning, "Choose a column to filter");
            return;
        };
        let Some(&op) = target.operators.get(self.filter.operator) else {
            self.set_status(StatusKind::Warning, "Choose an operator");
            return;
        };
        let value = match target.kind {
            ColumnKind::Numeric(NumericKind::Integer) => {
                FilterValue::Integer(self.filter.int_value)
            }
            ColumnKind::Numeric(NumericKind::Float) => FilterValue::Float(self.filter.float_value),
            ColumnKind::Text => FilterValue::Text(self.filter.text_value.clone()),
        };

        let result = target
            .spec(op, value)
            .and_then(|spec| filter::apply(&self.session, &spec));
        match result {
            Ok(outcome) => {
                if outcome.is_empty() {
                    self.set_status(StatusKind::Warning, "⚠ No rows match the given condition");
                } else {
                    self.set_status(
                        StatusKind::Success,
                        format!(
                            "✅ Filter applied: {} rows found out of {} total",
                            outcome.matched_rows, outcome.original_rows
                        ),
                    );
                }
                self.filter.outcome = Some(outcome);
            }
            Err(e) => {
                self.filter.outcome = None;
                self.report_error(&e);
            }
        }
    }

    /// Write the last filter result as CSV.
    pub fn save_export(&mut self, path: &Path) {
        let Some(outcome) = &self.filter.outcome else {
            return;
        };
        let written = outcome
            .export_csv()
            .map_err(anyhow::Error::from)
            .and_then(|csv| std::fs::write(path, csv).context("writing export"));
        match written {
            Ok(()) => {
                log::info!("Exported {} rows to {}", outcome.matched_rows, path.display());
                self.set_status(StatusKind::Success, format!("📥 Saved {}", path.display()));
            }
            Err(e) => {
                log::warn!("Export to {} failed: {e:#}", path.display());
                self.set_status(StatusKind::Error, format!("Export failed: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{NumericOp, Operator};

    fn loaded(csv: &str) -> AppState {
        let mut state = AppState::default();
        state.pick_upload("people.csv".into(), csv.as_bytes().to_vec());
        state.load_upload();
        state
    }

    #[test]
    fn load_without_upload_asks_for_a_file() {
        let mut state = AppState::default();
        state.load_upload();
        assert_eq!(state.status.unwrap().kind, StatusKind::Info);
        assert!(state.session.dataset().is_err());
    }

    #[test]
    fn successful_load_seeds_every_section() {
        let state = loaded("age,name,score,city\n10,a,1.5,x\n20,b,2.5,y\n30,c,3.5,z\n");
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Success);
        assert_eq!(state.last_load.as_ref().unwrap().rows, 3);
        assert!(state.views.is_some());
        assert_eq!(state.select.multi_columns, vec!["age", "name", "score"]);
        assert_eq!(state.select.range_end, 3);
        assert_eq!(state.filter.column, "age");
        assert_eq!(state.filter.int_value, 20);
        assert_eq!(state.head_rows, 3);
    }

    #[test]
    fn failed_load_reports_error_and_keeps_dataset() {
        let mut state = loaded("a\n1\n");
        state.pick_upload("bad.csv".into(), b"a,b\n1\n".to_vec());
        state.load_upload();
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Error);
        assert_eq!(state.session.dataset().unwrap().column_names(), vec!["a"]);
        assert_eq!(state.loaded_name.as_deref(), Some("people.csv"));
    }

    #[test]
    fn filter_flow_through_state() {
        let mut state = loaded("age\n10\n20\n30\n");
        state.filter.operator = state
            .filter
            .target
            .as_ref()
            .unwrap()
            .operators
            .iter()
            .position(|op| *op == Operator::Numeric(NumericOp::Ge))
            .unwrap();
        state.filter.int_value = 20;
        state.apply_filter();
        let outcome = state.filter.outcome.as_ref().unwrap();
        assert_eq!(outcome.matched_rows, 2);
        assert_eq!(outcome.match_pct, 66.7);

        state.filter.int_value = 99;
        state.apply_filter();
        assert!(state.filter.outcome.as_ref().unwrap().is_empty());
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Warning);
    }

    #[test]
    fn export_writes_csv_file() {
        let mut state = loaded("age\n10\n20\n30\n");
        state.apply_filter();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        state.save_export(&path);
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("age\n"));
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Success);
    }

    #[test]
    fn selections_without_dataset_warn() {
        let mut state = AppState::default();
        state.show_range();
        assert_eq!(state.status.as_ref().unwrap().kind, StatusKind::Warning);
    }

    #[test]
    fn toggling_columns_keeps_pick_order() {
        let mut state = loaded("a,b,c,d\n1,2,3,4\n");
        state.toggle_multi_column("b");
        state.toggle_multi_column("d");
        state.toggle_multi_column("b");
        assert_eq!(state.select.multi_columns, vec!["a", "c", "d", "b"]);
    }
}
