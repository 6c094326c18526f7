use std::collections::HashSet;
use std::fmt;

use arrow::array::{AsArray, BooleanArray};
use arrow::datatypes::{Float64Type, Int64Type};

use super::model::{CellValue, ColumnType, Dataset};
use super::select::unique_count;
use super::session::Session;
use super::stats;
use crate::error::{ExploreError, Result};

/// How many distinct values a text column shows as examples.
const EXAMPLE_VALUES: usize = 10;

// ---------------------------------------------------------------------------
// Column kinds and their operator sets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

/// Which family of operators a column accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric(NumericKind),
    Text,
}

impl ColumnKind {
    pub fn of(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Integer => ColumnKind::Numeric(NumericKind::Integer),
            ColumnType::Float => ColumnKind::Numeric(NumericKind::Float),
            ColumnType::Text => ColumnKind::Text,
        }
    }

    pub fn operators(self) -> Vec<Operator> {
        match self {
            ColumnKind::Numeric(_) => NumericOp::ALL.into_iter().map(Operator::Numeric).collect(),
            ColumnKind::Text => TextOp::ALL.into_iter().map(Operator::Text).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

impl NumericOp {
    pub const ALL: [NumericOp; 6] = [
        NumericOp::Gt,
        NumericOp::Lt,
        NumericOp::Ge,
        NumericOp::Le,
        NumericOp::Eq,
        NumericOp::Ne,
    ];

    pub fn eval<T: PartialOrd>(self, cell: T, value: T) -> bool {
        match self {
            NumericOp::Gt => cell > value,
            NumericOp::Lt => cell < value,
            NumericOp::Ge => cell >= value,
            NumericOp::Le => cell <= value,
            NumericOp::Eq => cell == value,
            NumericOp::Ne => cell != value,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            NumericOp::Gt => ">",
            NumericOp::Lt => "<",
            NumericOp::Ge => ">=",
            NumericOp::Le => "<=",
            NumericOp::Eq => "==",
            NumericOp::Ne => "!=",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            NumericOp::Gt => "gt",
            NumericOp::Lt => "lt",
            NumericOp::Ge => "ge",
            NumericOp::Le => "le",
            NumericOp::Eq => "eq",
            NumericOp::Ne => "ne",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Eq,
    Ne,
    Contains,
    StartsWith,
    EndsWith,
}

impl TextOp {
    pub const ALL: [TextOp; 5] = [
        TextOp::Eq,
        TextOp::Ne,
        TextOp::Contains,
        TextOp::StartsWith,
        TextOp::EndsWith,
    ];

    pub fn eval(self, cell: &str, value: &str) -> bool {
        match self {
            TextOp::Eq => cell == value,
            TextOp::Ne => cell != value,
            TextOp::Contains => cell.contains(value),
            TextOp::StartsWith => cell.starts_with(value),
            TextOp::EndsWith => cell.ends_with(value),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TextOp::Eq => "==",
            TextOp::Ne => "!=",
            TextOp::Contains => "contains",
            TextOp::StartsWith => "starts with",
            TextOp::EndsWith => "ends with",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            TextOp::Eq => "eq",
            TextOp::Ne => "ne",
            TextOp::Contains => "contains",
            TextOp::StartsWith => "starts_with",
            TextOp::EndsWith => "ends_with",
        }
    }
}

/// An operator from either family, as offered in the operator picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Numeric(NumericOp),
    Text(TextOp),
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Numeric(op) => write!(f, "{}", op.symbol()),
            Operator::Text(op) => write!(f, "{}", op.symbol()),
        }
    }
}

// ---------------------------------------------------------------------------
// Predicate and filter spec
// ---------------------------------------------------------------------------

/// Comparison value typed like the column it targets.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Integer { op: NumericOp, value: i64 },
    Float { op: NumericOp, value: f64 },
    Text { op: TextOp, value: String },
}

impl Predicate {
    fn slug(&self) -> &'static str {
        match self {
            Predicate::Integer { op, .. } | Predicate::Float { op, .. } => op.slug(),
            Predicate::Text { op, .. } => op.slug(),
        }
    }

    fn value_text(&self) -> String {
        match self {
            Predicate::Integer { value, .. } => value.to_string(),
            Predicate::Float { value, .. } => CellValue::Float(*value).to_string(),
            Predicate::Text { value, .. } => value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub column: String,
    pub predicate: Predicate,
}

impl FilterSpec {
    /// `filtered_{column}_{op}_{value}.csv`, with unsafe characters replaced by `_`.
    pub fn export_file_name(&self) -> String {
        format!(
            "filtered_{}_{}_{}.csv",
            sanitize(&self.column),
            self.predicate.slug(),
            sanitize(&self.predicate.value_text())
        )
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// FilterTarget – a column resolved for filtering
// ---------------------------------------------------------------------------

/// Everything the filter form needs about the chosen column, resolved once
/// when the column is picked.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTarget {
    pub column: String,
    pub kind: ColumnKind,
    pub operators: Vec<Operator>,
    /// Pre-filled comparison value: the column median, or empty text.
    pub default_value: FilterValue,
    pub unique: usize,
    pub min: Option<CellValue>,
    pub max: Option<CellValue>,
    /// First distinct values of a text column.
    pub examples: Vec<String>,
}

impl FilterTarget {
    pub fn resolve(ds: &Dataset, column: &str) -> Result<Self> {
        let col = ds
            .column_index(column)
            .ok_or_else(|| ExploreError::invalid(format!("Unknown column '{column}'")))?;
        let kind = ColumnKind::of(ds.column_type(col));

        let mut target = FilterTarget {
            column: column.to_string(),
            kind,
            operators: kind.operators(),
            default_value: FilterValue::Text(String::new()),
            unique: unique_count(ds, col),
            min: None,
            max: None,
            examples: Vec::new(),
        };

        match kind {
            ColumnKind::Numeric(NumericKind::Integer) => {
                // Stay in i64: ids past 2^53 do not survive a trip through f64.
                let mut values: Vec<i64> = ds
                    .column(col)
                    .as_primitive::<Int64Type>()
                    .iter()
                    .flatten()
                    .collect();
                values.sort_unstable();
                target.min = values.first().map(|&v| CellValue::Integer(v));
                target.max = values.last().map(|&v| CellValue::Integer(v));
                target.default_value = FilterValue::Integer(median_i64(&values).unwrap_or(0));
            }
            ColumnKind::Numeric(NumericKind::Float) => {
                let sorted = stats::sorted(&ds.numeric_values(col));
                target.min = sorted.first().map(|&v| CellValue::Float(v));
                target.max = sorted.last().map(|&v| CellValue::Float(v));
                target.default_value =
                    FilterValue::Float(stats::quantile_sorted(&sorted, 0.5).unwrap_or(0.0));
            }
            ColumnKind::Text => {
                let mut seen = HashSet::new();
                target.examples = ds
                    .column_values(col)
                    .into_iter()
                    .filter_map(|v| match v {
                        CellValue::Text(s) => Some(s),
                        _ => None,
                    })
                    .filter(|s| seen.insert(s.clone()))
                    .take(EXAMPLE_VALUES)
                    .collect();
            }
        }
        Ok(target)
    }

    /// Pair an operator with a value; both must belong to this column's kind.
    pub fn spec(&self, op: Operator, value: FilterValue) -> Result<FilterSpec> {
        let predicate = match (self.kind, op, value) {
            (
                ColumnKind::Numeric(NumericKind::Integer),
                Operator::Numeric(op),
                FilterValue::Integer(value),
            ) => Predicate::Integer { op, value },
            (
                ColumnKind::Numeric(NumericKind::Float),
                Operator::Numeric(op),
                FilterValue::Float(value),
            ) => Predicate::Float { op, value },
            (ColumnKind::Text, Operator::Text(op), FilterValue::Text(value)) => {
                Predicate::Text { op, value }
            }
            (kind, op, value) => {
                return Err(ExploreError::invalid(format!(
                    "Operator '{op}' with value {value:?} does not apply to {kind:?} column '{}'",
                    self.column
                )));
            }
        };
        Ok(FilterSpec {
            column: self.column.clone(),
            predicate,
        })
    }
}

/// Median of sorted integers; an even count averages the middle pair,
/// rounding toward zero.
fn median_i64(sorted: &[i64]) -> Option<i64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        return Some(sorted[n / 2]);
    }
    let sum = i128::from(sorted[n / 2 - 1]) + i128::from(sorted[n / 2]);
    // The mean of two i64 values always fits back into i64.
    Some((sum / 2) as i64)
}

// ---------------------------------------------------------------------------
// Applying a filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub spec: FilterSpec,
    pub data: Dataset,
    pub original_rows: usize,
    pub matched_rows: usize,
    /// Matched share in percent, rounded to 1 decimal.
    pub match_pct: f64,
}

impl FilterOutcome {
    /// Nothing matched. A normal outcome, not an error.
    pub fn is_empty(&self) -> bool {
        self.matched_rows == 0
    }

    pub fn export_csv(&self) -> Result<String> {
        self.data.to_csv()
    }

    pub fn export_file_name(&self) -> String {
        self.spec.export_file_name()
    }
}

/// Evaluate `spec` against the session's current dataset.
///
/// Null cells never match, whatever the operator.
pub fn apply(session: &Session, spec: &FilterSpec) -> Result<FilterOutcome> {
    let ds = session.dataset()?;
    let col = ds
        .column_index(&spec.column)
        .ok_or_else(|| ExploreError::invalid(format!("Unknown column '{}'", spec.column)))?;
    let array = ds.column(col);

    let mask: Vec<bool> = match (&spec.predicate, ds.column_type(col)) {
        (Predicate::Integer { op, value }, ColumnType::Integer) => array
            .as_primitive::<Int64Type>()
            .iter()
            .map(|cell| cell.is_some_and(|v| op.eval(v, *value)))
            .collect(),
        (Predicate::Float { op, value }, ColumnType::Float) => array
            .as_primitive::<Float64Type>()
            .iter()
            .map(|cell| cell.is_some_and(|v| op.eval(v, *value)))
            .collect(),
        (Predicate::Text { op, value }, ColumnType::Text) => array
            .as_string::<i32>()
            .iter()
            .map(|cell| cell.is_some_and(|s| op.eval(s, value)))
            .collect(),
        (predicate, column_type) => {
            return Err(ExploreError::invalid(format!(
                "{predicate:?} does not match column '{}' of type {column_type}",
                spec.column
            )));
        }
    };

    let data = ds.filter(&BooleanArray::from(mask))?;
    let original_rows = ds.num_rows();
    let matched_rows = data.num_rows();
    let match_pct = if original_rows == 0 {
        0.0
    } else {
        stats::round_to(matched_rows as f64 / original_rows as f64 * 100.0, 1)
    };
    log::debug!(
        "Filter {:?} on '{}': {matched_rows}/{original_rows} rows",
        spec.predicate,
        spec.column
    );

    Ok(FilterOutcome {
        spec: spec.clone(),
        data,
        original_rows,
        matched_rows,
        match_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{ParseOptions, load_csv};

    fn session(csv: &str) -> Session {
        let mut s = Session::new();
        s.load(csv.as_bytes(), &ParseOptions::default(), 5).unwrap();
        s
    }

    fn int_spec(column: &str, op: NumericOp, value: i64) -> FilterSpec {
        FilterSpec {
            column: column.into(),
            predicate: Predicate::Integer { op, value },
        }
    }

    fn text_spec(column: &str, op: TextOp, value: &str) -> FilterSpec {
        FilterSpec {
            column: column.into(),
            predicate: Predicate::Text { op, value: value.into() },
        }
    }

    #[test]
    fn integer_ge_keeps_matching_rows() {
        let s = session("age\n10\n20\n30\n");
        let out = apply(&s, &int_spec("age", NumericOp::Ge, 20)).unwrap();
        assert_eq!(out.original_rows, 3);
        assert_eq!(out.matched_rows, 2);
        assert_eq!(out.match_pct, 66.7);
        assert_eq!(
            out.data.column_values(0),
            vec![CellValue::Integer(20), CellValue::Integer(30)]
        );
    }

    #[test]
    fn contains_skips_nulls() {
        let s = session("animal,n\ncat,1\ndog,2\ncar,3\n,4\n");
        let out = apply(&s, &text_spec("animal", TextOp::Contains, "ca")).unwrap();
        assert_eq!(
            out.data.column_values(0),
            vec![CellValue::Text("cat".into()), CellValue::Text("car".into())]
        );
    }

    #[test]
    fn text_operators() {
        let s = session("w\napple\nbanana\napricot\n");
        let count = |op, v| apply(&s, &text_spec("w", op, v)).unwrap().matched_rows;
        assert_eq!(count(TextOp::StartsWith, "ap"), 2);
        assert_eq!(count(TextOp::EndsWith, "na"), 1);
        assert_eq!(count(TextOp::Eq, "banana"), 1);
        assert_eq!(count(TextOp::Ne, "banana"), 2);
    }

    #[test]
    fn nulls_never_match_not_equal() {
        let s = session("x,tag\n1.5,a\n,b\n2.5,c\n");
        let spec = FilterSpec {
            column: "x".into(),
            predicate: Predicate::Float { op: NumericOp::Ne, value: 1.5 },
        };
        let out = apply(&s, &spec).unwrap();
        assert_eq!(out.matched_rows, 1);
    }

    #[test]
    fn subtype_mismatch_is_invalid_input() {
        let s = session("x\n1.5\n2.5\n");
        let err = apply(&s, &int_spec("x", NumericOp::Gt, 1)).unwrap_err();
        assert!(matches!(err, ExploreError::InvalidInput(_)));
    }

    #[test]
    fn no_match_is_a_neutral_outcome() {
        let s = session("age\n10\n20\n");
        let out = apply(&s, &int_spec("age", NumericOp::Gt, 100)).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.match_pct, 0.0);
    }

    #[test]
    fn filter_sees_the_latest_load() {
        let mut s = session("age\n10\n20\n");
        s.load(b"age\n50\n60\n70\n", &ParseOptions::default(), 5).unwrap();
        let out = apply(&s, &int_spec("age", NumericOp::Gt, 15)).unwrap();
        assert_eq!(out.original_rows, 3);
        assert_eq!(out.matched_rows, 3);
    }

    #[test]
    fn export_reparses_to_same_rows() {
        let s = session("id,name,score\n1,\"Doe, J\",2.5\n2,Ann,\n3,Bob,4.0\n");
        let out = apply(&s, &int_spec("id", NumericOp::Le, 2)).unwrap();
        let csv = out.export_csv().unwrap();
        let back = load_csv(csv.as_bytes(), &ParseOptions::default()).unwrap();
        assert_eq!(back.column_names(), out.data.column_names());
        assert_eq!(back.num_rows(), 2);
        for r in 0..2 {
            assert_eq!(back.row(r), out.data.row(r));
        }
    }

    #[test]
    fn export_name_is_sanitized() {
        let spec = text_spec("home city", TextOp::StartsWith, "São/Paulo");
        assert_eq!(spec.export_file_name(), "filtered_home_city_starts_with_S_o_Paulo.csv");
        let spec = int_spec("age", NumericOp::Ge, 20);
        assert_eq!(spec.export_file_name(), "filtered_age_ge_20.csv");
    }

    #[test]
    fn target_resolves_operators_and_defaults() {
        let s = session("age,city\n10,Lima\n20,Quito\n30,Lima\n");
        let ds = s.dataset().unwrap();

        let age = FilterTarget::resolve(ds, "age").unwrap();
        assert_eq!(age.kind, ColumnKind::Numeric(NumericKind::Integer));
        assert_eq!(age.operators.len(), 6);
        assert_eq!(age.default_value, FilterValue::Integer(20));
        assert_eq!(age.min, Some(CellValue::Integer(10)));
        assert_eq!(age.max, Some(CellValue::Integer(30)));

        let city = FilterTarget::resolve(ds, "city").unwrap();
        assert_eq!(city.kind, ColumnKind::Text);
        assert_eq!(city.operators.len(), 5);
        assert_eq!(city.examples, vec!["Lima", "Quito"]);
        assert_eq!(city.unique, 2);
    }

    #[test]
    fn target_rejects_wrong_operator_family() {
        let s = session("city\nLima\n");
        let city = FilterTarget::resolve(s.dataset().unwrap(), "city").unwrap();
        assert!(city
            .spec(Operator::Numeric(NumericOp::Gt), FilterValue::Integer(1))
            .is_err());
        let spec = city
            .spec(Operator::Text(TextOp::Contains), FilterValue::Text("Li".into()))
            .unwrap();
        assert_eq!(apply(&s, &spec).unwrap().matched_rows, 1);
    }

    #[test]
    fn large_integer_ids_keep_exact_bounds() {
        let s = session("id\n9007199254740993\n9007199254740995\n9007199254740997\n");
        let id = FilterTarget::resolve(s.dataset().unwrap(), "id").unwrap();
        assert_eq!(id.min, Some(CellValue::Integer(9_007_199_254_740_993)));
        assert_eq!(id.max, Some(CellValue::Integer(9_007_199_254_740_997)));
        assert_eq!(id.default_value, FilterValue::Integer(9_007_199_254_740_995));

        let spec = id
            .spec(Operator::Numeric(NumericOp::Eq), id.default_value.clone())
            .unwrap();
        assert_eq!(apply(&s, &spec).unwrap().matched_rows, 1);
    }

    #[test]
    fn integer_median_of_even_count_rounds_toward_zero() {
        assert_eq!(median_i64(&[1, 2]), Some(1));
        assert_eq!(median_i64(&[-3, -2]), Some(-2));
        assert_eq!(median_i64(&[i64::MAX - 1, i64::MAX]), Some(i64::MAX - 1));
        assert_eq!(median_i64(&[]), None);
    }
}
