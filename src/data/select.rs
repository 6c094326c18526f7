use std::collections::HashSet;

use super::model::{CellValue, ColumnType, Dataset};
use super::session::Session;
use super::stats;
use crate::error::{ExploreError, Result};

// ---------------------------------------------------------------------------
// Column selection
// ---------------------------------------------------------------------------

/// A close look at one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDetail {
    pub name: String,
    pub column_type: ColumnType,
    /// Leading values, nulls included.
    pub sample: Vec<CellValue>,
    pub unique: usize,
    pub nulls: usize,
    /// Only set for numeric columns with at least one value.
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

pub fn column_detail(session: &Session, name: &str, sample_size: usize) -> Result<ColumnDetail> {
    let ds = session.dataset()?;
    let col = column_position(ds, name)?;
    let column_type = ds.column_type(col);

    let (mean, median) = if column_type.is_numeric() {
        let values = ds.numeric_values(col);
        (stats::mean(&values), stats::median(&values))
    } else {
        (None, None)
    };

    Ok(ColumnDetail {
        name: name.to_string(),
        column_type,
        sample: ds.head(sample_size).column_values(col),
        unique: unique_count(ds, col),
        nulls: ds.null_count(col),
        mean,
        median,
    })
}

/// Initial pick for the multi-column selector: the first three columns.
pub fn default_columns(ds: &Dataset) -> Vec<String> {
    ds.column_names().into_iter().take(3).collect()
}

/// Per-column facts shown under a projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedColumn {
    pub name: String,
    pub column_type: ColumnType,
    pub non_null: usize,
    pub unique: usize,
}

#[derive(Debug, Clone)]
pub struct Projection {
    pub data: Dataset,
    pub columns: Vec<ProjectedColumn>,
}

/// The chosen columns, in the order given.
pub fn project(session: &Session, names: &[String]) -> Result<Projection> {
    let ds = session.dataset()?;
    if names.is_empty() {
        return Err(ExploreError::invalid("Select at least one column"));
    }
    let positions = names
        .iter()
        .map(|n| column_position(ds, n))
        .collect::<Result<Vec<_>>>()?;

    let data = ds.project(&positions)?;
    let columns = (0..data.num_columns())
        .map(|c| ProjectedColumn {
            name: data.column_name(c),
            column_type: data.column_type(c),
            non_null: data.non_null_count(c),
            unique: unique_count(&data, c),
        })
        .collect();

    Ok(Projection { data, columns })
}

// ---------------------------------------------------------------------------
// Row selection
// ---------------------------------------------------------------------------

/// Rows `[start, end)`.
pub fn row_range(session: &Session, start: usize, end: usize) -> Result<Dataset> {
    let ds = session.dataset()?;
    if end <= start {
        return Err(ExploreError::invalid(format!(
            "End row ({end}) must be greater than start row ({start})"
        )));
    }
    if end > ds.num_rows() {
        return Err(ExploreError::invalid(format!(
            "End row ({end}) is past the last row ({})",
            ds.num_rows()
        )));
    }
    Ok(ds.slice(start, end - start))
}

/// Parse "0, 5,10" into integers. Any token that is not an integer fails the whole list.
pub fn parse_indices(text: &str) -> Result<Vec<i64>> {
    text.split(',')
        .map(|tok| {
            tok.trim()
                .parse::<i64>()
                .map_err(|_| {
                    ExploreError::invalid("Please enter valid indices separated by commas")
                })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct RowPick {
    /// Indices actually used, in the order given.
    pub indices: Vec<usize>,
    pub data: Dataset,
}

/// Rows at the listed indices. Out-of-range indices are dropped silently;
/// order and repeats are kept.
pub fn rows_at(session: &Session, text: &str) -> Result<RowPick> {
    let ds = session.dataset()?;
    let rows = ds.num_rows();
    let indices: Vec<usize> = parse_indices(text)?
        .into_iter()
        .filter_map(|i| usize::try_from(i).ok())
        .filter(|&i| i < rows)
        .collect();

    if indices.is_empty() {
        return Err(ExploreError::invalid("No valid indices found"));
    }
    let data = ds.take(&indices)?;
    Ok(RowPick { indices, data })
}

// -- helpers --

fn column_position(ds: &Dataset, name: &str) -> Result<usize> {
    ds.column_index(name)
        .ok_or_else(|| ExploreError::invalid(format!("Unknown column '{name}'")))
}

/// Distinct non-null values in a column.
pub(crate) fn unique_count(ds: &Dataset, col: usize) -> usize {
    ds.column_values(col)
        .into_iter()
        .filter(|v| !v.is_null())
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::ParseOptions;

    fn ten_rows() -> Session {
        let mut csv = String::from("n,sq,label\n");
        for i in 0..10 {
            csv.push_str(&format!("{i},{},{}\n", i * i, if i % 2 == 0 { "even" } else { "odd" }));
        }
        let mut s = Session::new();
        s.load(csv.as_bytes(), &ParseOptions::default(), 5).unwrap();
        s
    }

    #[test]
    fn column_detail_for_numeric_column() {
        let s = ten_rows();
        let d = column_detail(&s, "n", 10).unwrap();
        assert_eq!(d.column_type, ColumnType::Integer);
        assert_eq!(d.sample.len(), 10);
        assert_eq!(d.unique, 10);
        assert_eq!(d.nulls, 0);
        assert_eq!(d.mean, Some(4.5));
        assert_eq!(d.median, Some(4.5));
    }

    #[test]
    fn column_detail_for_text_column_has_no_mean() {
        let s = ten_rows();
        let d = column_detail(&s, "label", 3).unwrap();
        assert_eq!(
            d.sample,
            vec![
                CellValue::Text("even".into()),
                CellValue::Text("odd".into()),
                CellValue::Text("even".into()),
            ]
        );
        assert_eq!(d.unique, 2);
        assert_eq!(d.mean, None);
        assert_eq!(d.median, None);
    }

    #[test]
    fn unknown_column_is_invalid_input() {
        let s = ten_rows();
        assert!(matches!(column_detail(&s, "nope", 10), Err(ExploreError::InvalidInput(_))));
    }

    #[test]
    fn projection_follows_requested_order() {
        let s = ten_rows();
        let names = vec!["label".to_string(), "n".to_string()];
        let p = project(&s, &names).unwrap();
        assert_eq!(p.data.column_names(), names);
        assert_eq!(p.data.num_rows(), 10);
        assert_eq!(p.columns[0].unique, 2);
        assert_eq!(p.columns[1].non_null, 10);
        assert!(project(&s, &[]).is_err());
    }

    #[test]
    fn default_columns_are_first_three() {
        let s = ten_rows();
        assert_eq!(default_columns(s.dataset().unwrap()), vec!["n", "sq", "label"]);
    }

    #[test]
    fn row_range_returns_half_open_slice() {
        let s = ten_rows();
        let rows = row_range(&s, 0, 5).unwrap();
        assert_eq!(rows.num_rows(), 5);
        for r in 0..5 {
            assert_eq!(rows.row(r), s.dataset().unwrap().row(r));
        }
        assert!(row_range(&s, 5, 5).is_err());
        assert!(row_range(&s, 3, 11).is_err());
    }

    #[test]
    fn explicit_indices_drop_out_of_range() {
        let s = ten_rows();
        let pick = rows_at(&s, "0,5,100").unwrap();
        assert_eq!(pick.indices, vec![0, 5]);
        assert_eq!(pick.data.num_rows(), 2);
        assert_eq!(pick.data.cell(1, 0), CellValue::Integer(5));
    }

    #[test]
    fn explicit_indices_keep_order_and_repeats() {
        let s = ten_rows();
        let pick = rows_at(&s, " 7, 2 ,7,-1").unwrap();
        assert_eq!(pick.indices, vec![7, 2, 7]);
        assert_eq!(pick.data.cell(0, 0), CellValue::Integer(7));
    }

    #[test]
    fn explicit_indices_report_bad_input() {
        let s = ten_rows();
        assert!(matches!(rows_at(&s, "1,x"), Err(ExploreError::InvalidInput(_))));
        let err = rows_at(&s, "50,60").unwrap_err();
        assert_eq!(err.to_string(), "No valid indices found");
    }
}
