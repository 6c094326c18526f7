use std::collections::{BTreeMap, HashSet};

use arrow::array::AsArray;
use arrow::datatypes::DataType;

use super::model::{CellValue, ColumnType, Dataset};
use super::session::Session;
use super::stats;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Row windows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    Head(usize),
    Tail(usize),
}

/// First or last N rows, with N clamped to `[1, row_count]`.
pub fn row_window(session: &Session, window: Window) -> Result<Dataset> {
    let ds = session.dataset()?;
    let clamp = |n: usize| n.clamp(1, ds.num_rows().max(1));
    Ok(match window {
        Window::Head(n) => ds.head(clamp(n)),
        Window::Tail(n) => ds.tail(clamp(n)),
    })
}

// ---------------------------------------------------------------------------
// Schema and aggregate metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub column_type: ColumnType,
    pub non_null: usize,
    pub nulls: usize,
    /// Share of null cells, in percent, rounded to 2 decimals.
    pub null_pct: f64,
}

pub fn schema(session: &Session) -> Result<Vec<ColumnSchema>> {
    let ds = session.dataset()?;
    let rows = ds.num_rows();
    Ok((0..ds.num_columns())
        .map(|c| {
            let nulls = ds.null_count(c);
            let null_pct = if rows == 0 {
                0.0
            } else {
                stats::round_to(nulls as f64 / rows as f64 * 100.0, 2)
            };
            ColumnSchema {
                name: ds.column_name(c),
                column_type: ds.column_type(c),
                non_null: rows - nulls,
                nulls,
                null_pct,
            }
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMetrics {
    pub rows: usize,
    pub columns: usize,
    pub cells: usize,
    pub nulls: usize,
    pub memory_mb: f64,
    /// Rows identical to an earlier row.
    pub duplicates: usize,
}

pub fn metrics(session: &Session) -> Result<DatasetMetrics> {
    let ds = session.dataset()?;
    let nulls = (0..ds.num_columns()).map(|c| ds.null_count(c)).sum();

    let mut seen: HashSet<Vec<CellValue>> = HashSet::with_capacity(ds.num_rows());
    let duplicates = (0..ds.num_rows())
        .filter(|&r| !seen.insert(ds.row(r)))
        .count();

    Ok(DatasetMetrics {
        rows: ds.num_rows(),
        columns: ds.num_columns(),
        cells: ds.num_rows() * ds.num_columns(),
        nulls,
        memory_mb: ds.memory_bytes() as f64 / (1024.0 * 1024.0),
        duplicates,
    })
}

// ---------------------------------------------------------------------------
// Numeric summary (describe)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NumericStats {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NumericSummary {
    NoNumericColumns,
    Columns(Vec<NumericStats>),
}

pub fn numeric_summary(session: &Session) -> Result<NumericSummary> {
    let ds = session.dataset()?;
    let columns: Vec<NumericStats> = (0..ds.num_columns())
        .filter(|&c| ds.column_type(c).is_numeric())
        .map(|c| describe_column(ds, c))
        .collect();

    if columns.is_empty() {
        Ok(NumericSummary::NoNumericColumns)
    } else {
        Ok(NumericSummary::Columns(columns))
    }
}

fn describe_column(ds: &Dataset, col: usize) -> NumericStats {
    let values = stats::sorted(&ds.numeric_values(col));
    NumericStats {
        column: ds.column_name(col),
        count: values.len(),
        mean: stats::mean(&values),
        std: stats::std_dev(&values),
        min: values.first().copied(),
        q25: stats::quantile_sorted(&values, 0.25),
        q50: stats::quantile_sorted(&values, 0.5),
        q75: stats::quantile_sorted(&values, 0.75),
        max: values.last().copied(),
    }
}

// ---------------------------------------------------------------------------
// Categorical summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CategoricalSummary {
    pub column: String,
    pub unique: usize,
    /// Most frequent value, or "N/A" when the column is entirely null.
    pub top: String,
    pub freq: usize,
}

pub fn categorical_summary(session: &Session) -> Result<Vec<CategoricalSummary>> {
    let ds = session.dataset()?;
    Ok((0..ds.num_columns())
        .filter(|&c| ds.column_type(c) == ColumnType::Text)
        .map(|c| {
            let counts = text_counts(ds, c);
            let (top, freq) = match most_frequent(&counts) {
                Some((value, freq)) => (value.to_string(), freq),
                None => ("N/A".to_string(), 0),
            };
            CategoricalSummary {
                column: ds.column_name(c),
                unique: counts.len(),
                top,
                freq,
            }
        })
        .collect())
}

/// Occurrences of each non-null value in a text column.
pub(crate) fn text_counts(ds: &Dataset, col: usize) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    let array = ds.column(col);
    if array.data_type() == &DataType::Utf8 {
        for value in array.as_string::<i32>().iter().flatten() {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    counts
}

/// Highest count; ties go to the smallest value.
fn most_frequent<'a>(counts: &BTreeMap<&'a str, usize>) -> Option<(&'a str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for (&value, &count) in counts {
        match best {
            Some((_, top)) if top >= count => {}
            _ => best = Some((value, count)),
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
    /// (position, name, type) per column.
    pub columns: Vec<(usize, String, ColumnType)>,
    pub rows: usize,
    pub cols: usize,
    /// Columns per type, most common first.
    pub type_counts: Vec<(ColumnType, usize)>,
}

pub fn structure(session: &Session) -> Result<Structure> {
    let ds = session.dataset()?;
    let columns: Vec<(usize, String, ColumnType)> = (0..ds.num_columns())
        .map(|c| (c, ds.column_name(c), ds.column_type(c)))
        .collect();

    let mut by_type: BTreeMap<ColumnType, usize> = BTreeMap::new();
    for (_, _, t) in &columns {
        *by_type.entry(*t).or_insert(0) += 1;
    }
    let mut type_counts: Vec<(ColumnType, usize)> = by_type.into_iter().collect();
    type_counts.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(Structure {
        columns,
        rows: ds.num_rows(),
        cols: ds.num_columns(),
        type_counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::ParseOptions;
    use crate::error::ExploreError;

    fn session(csv: &str) -> Session {
        let mut s = Session::new();
        s.load(csv.as_bytes(), &ParseOptions::default(), 5).unwrap();
        s
    }

    fn people() -> Session {
        session(
            "id,age,city,score\n\
             1,30,Lima,1.5\n\
             2,40,Quito,\n\
             3,50,Lima,3.5\n\
             3,50,Lima,3.5\n\
             5,60,,2.0\n",
        )
    }

    #[test]
    fn every_view_fails_closed_without_dataset() {
        let empty = Session::new();
        assert!(matches!(row_window(&empty, Window::Head(5)), Err(ExploreError::NoDataset)));
        assert!(matches!(schema(&empty), Err(ExploreError::NoDataset)));
        assert!(matches!(metrics(&empty), Err(ExploreError::NoDataset)));
        assert!(matches!(numeric_summary(&empty), Err(ExploreError::NoDataset)));
        assert!(matches!(categorical_summary(&empty), Err(ExploreError::NoDataset)));
        assert!(matches!(structure(&empty), Err(ExploreError::NoDataset)));
    }

    #[test]
    fn row_window_is_bounded() {
        let s = people();
        assert_eq!(row_window(&s, Window::Head(0)).unwrap().num_rows(), 1);
        assert_eq!(row_window(&s, Window::Head(3)).unwrap().num_rows(), 3);
        let tail = row_window(&s, Window::Tail(99)).unwrap();
        assert_eq!(tail.num_rows(), 5);
        assert_eq!(row_window(&s, Window::Tail(1)).unwrap().cell(0, 0), CellValue::Integer(5));
    }

    #[test]
    fn schema_reports_nulls_and_is_stable() {
        let s = people();
        let first = schema(&s).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(first[2].name, "city");
        assert_eq!(first[2].column_type, ColumnType::Text);
        assert_eq!(first[2].nulls, 1);
        assert_eq!(first[2].non_null, 4);
        assert_eq!(first[2].null_pct, 20.0);
        assert_eq!(first[3].column_type, ColumnType::Float);
        assert_eq!(schema(&s).unwrap(), first);
    }

    #[test]
    fn metrics_add_up() {
        let s = people();
        let m = metrics(&s).unwrap();
        assert_eq!(m.cells, 5 * 4);
        let per_column: usize = schema(&s).unwrap().iter().map(|c| c.nulls).sum();
        assert_eq!(m.nulls, per_column);
        assert_eq!(m.nulls, 2);
        assert_eq!(m.duplicates, 1);
        assert!(m.memory_mb > 0.0);
    }

    #[test]
    fn describe_numeric_columns() {
        let s = people();
        let NumericSummary::Columns(cols) = numeric_summary(&s).unwrap() else {
            panic!("expected numeric columns");
        };
        assert_eq!(cols.len(), 3);
        let age = &cols[1];
        assert_eq!(age.column, "age");
        assert_eq!(age.count, 5);
        assert_eq!(age.mean, Some(46.0));
        assert_eq!(age.min, Some(30.0));
        assert_eq!(age.q25, Some(40.0));
        assert_eq!(age.q50, Some(50.0));
        assert_eq!(age.max, Some(60.0));
        assert_eq!(cols[2].count, 4);
    }

    #[test]
    fn text_only_dataset_reports_no_numeric_columns() {
        let s = session("a,b\nx,y\nz,w\n");
        assert_eq!(numeric_summary(&s).unwrap(), NumericSummary::NoNumericColumns);
    }

    #[test]
    fn categorical_mode_and_frequency() {
        let s = people();
        let cats = categorical_summary(&s).unwrap();
        assert_eq!(cats.len(), 1);
        assert_eq!(cats[0].unique, 2);
        assert_eq!(cats[0].top, "Lima");
        assert_eq!(cats[0].freq, 3);
    }

    #[test]
    fn categorical_ties_pick_smallest_value() {
        let s = session("k,v,note\nb,1,x\na,2,\n");
        let cats = categorical_summary(&s).unwrap();
        assert_eq!(cats.len(), 2);
        assert_eq!(cats[0].top, "a");
        assert_eq!(cats[0].freq, 1);
        assert_eq!(cats[1].column, "note");
        assert_eq!(cats[1].top, "x");
    }

    #[test]
    fn no_values_means_no_mode() {
        assert_eq!(most_frequent(&BTreeMap::new()), None);
    }

    #[test]
    fn structure_counts_types() {
        let s = people();
        let st = structure(&s).unwrap();
        assert_eq!((st.rows, st.cols), (5, 4));
        assert_eq!(st.columns[1], (1, "age".to_string(), ColumnType::Integer));
        assert_eq!(st.type_counts[0], (ColumnType::Integer, 2));
        assert_eq!(st.type_counts.len(), 3);
    }
}
