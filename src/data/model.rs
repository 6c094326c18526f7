use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, UInt64Array};
use arrow::compute::{filter_record_batch, take_record_batch};
use arrow::csv::WriterBuilder;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::error::Result;

// ---------------------------------------------------------------------------
// ColumnType – the three column kinds a dataset can hold
// ---------------------------------------------------------------------------

/// Declared type of a column, displayed as `int64`, `float64` or `object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    pub fn from_data_type(dt: &DataType) -> Self {
        match dt {
            DataType::Int64 => ColumnType::Integer,
            DataType::Float64 => ColumnType::Float,
            _ => ColumnType::Text,
        }
    }

    pub fn data_type(self) -> DataType {
        match self {
            ColumnType::Integer => DataType::Int64,
            ColumnType::Float => DataType::Float64,
            ColumnType::Text => DataType::Utf8,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Integer => write!(f, "int64"),
            ColumnType::Float => write!(f, "float64"),
            ColumnType::Text => write!(f, "object"),
        }
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single cell pulled out of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Used as a key in `BTreeMap` / `HashSet` downstream so it must be `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in sets and maps --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Whole floats keep a trailing ".0" so they read as floats.
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the loaded table
// ---------------------------------------------------------------------------

/// An ordered set of uniquely named, typed columns of equal length.
///
/// Thin wrapper over an Arrow [`RecordBatch`]: every slice, projection and
/// row pick produces a new `Dataset` sharing the underlying buffers.
#[derive(Debug, Clone)]
pub struct Dataset {
    batch: RecordBatch,
}

impl Dataset {
    /// Wrap a batch whose columns are all `Int64`, `Float64` or `Utf8`.
    pub fn new(batch: RecordBatch) -> Self {
        Dataset { batch }
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.batch.schema().index_of(name).ok()
    }

    pub fn column_name(&self, col: usize) -> String {
        self.batch.schema().field(col).name().clone()
    }

    pub fn column_type(&self, col: usize) -> ColumnType {
        ColumnType::from_data_type(self.batch.column(col).data_type())
    }

    pub fn column(&self, col: usize) -> &ArrayRef {
        self.batch.column(col)
    }

    pub fn null_count(&self, col: usize) -> usize {
        self.batch.column(col).null_count()
    }

    pub fn non_null_count(&self, col: usize) -> usize {
        self.num_rows() - self.null_count(col)
    }

    /// Read a single cell.
    pub fn cell(&self, row: usize, col: usize) -> CellValue {
        cell_value(self.batch.column(col), row)
    }

    /// Read a full row, in column order.
    pub fn row(&self, row: usize) -> Vec<CellValue> {
        (0..self.num_columns()).map(|c| self.cell(row, c)).collect()
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, col: usize) -> Vec<CellValue> {
        let array = self.batch.column(col);
        (0..self.num_rows()).map(|r| cell_value(array, r)).collect()
    }

    /// Non-null values of a numeric column as `f64`. Empty for text columns.
    pub fn numeric_values(&self, col: usize) -> Vec<f64> {
        let array = self.batch.column(col);
        match array.data_type() {
            DataType::Int64 => array
                .as_primitive::<Int64Type>()
                .iter()
                .flatten()
                .map(|v| v as f64)
                .collect(),
            DataType::Float64 => array.as_primitive::<Float64Type>().iter().flatten().collect(),
            _ => Vec::new(),
        }
    }

    /// Contiguous rows `[offset, offset + len)`, clamped to the dataset.
    pub fn slice(&self, offset: usize, len: usize) -> Dataset {
        let offset = offset.min(self.num_rows());
        let len = len.min(self.num_rows() - offset);
        Dataset::new(self.batch.slice(offset, len))
    }

    pub fn head(&self, n: usize) -> Dataset {
        self.slice(0, n)
    }

    pub fn tail(&self, n: usize) -> Dataset {
        let n = n.min(self.num_rows());
        self.slice(self.num_rows() - n, n)
    }

    /// Rows at the given positions, in the given order (repeats allowed).
    pub fn take(&self, rows: &[usize]) -> Result<Dataset> {
        let indices = UInt64Array::from_iter_values(rows.iter().map(|&r| r as u64));
        Ok(Dataset::new(take_record_batch(&self.batch, &indices)?))
    }

    /// Columns at the given positions, in the given order.
    pub fn project(&self, cols: &[usize]) -> Result<Dataset> {
        Ok(Dataset::new(self.batch.project(cols)?))
    }

    /// Rows where `mask` is true; null mask entries drop the row.
    pub fn filter(&self, mask: &BooleanArray) -> Result<Dataset> {
        Ok(Dataset::new(filter_record_batch(&self.batch, mask)?))
    }

    /// Bytes held by the column buffers.
    pub fn memory_bytes(&self) -> usize {
        self.batch.get_array_memory_size()
    }

    /// Serialize as comma-separated text with a header row and no index column.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = WriterBuilder::new().with_header(true).build(Vec::new());
        writer.write(&self.batch)?;
        let bytes = writer.into_inner();
        let text = String::from_utf8(bytes).map_err(|e| ArrowError::ExternalError(Box::new(e)))?;
        Ok(text)
    }

    /// Box-drawn text table, for debug logging.
    pub fn pretty(&self) -> String {
        match pretty_format_batches(&[self.batch.clone()]) {
            Ok(table) => table.to_string(),
            Err(e) => format!("<unprintable dataset: {e}>"),
        }
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        other => CellValue::Text(format!("{other:?}")),
    }
}
