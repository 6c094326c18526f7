use std::borrow::Cow;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use encoding_rs::{UTF_8, WINDOWS_1252};
use serde::{Deserialize, Serialize};

use super::model::{ColumnType, Dataset};
use crate::error::ExploreError;

/// Cell texts read as missing values (compared after trimming).
const NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Parse options
// ---------------------------------------------------------------------------

/// Field separator offered in the load form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Delimiter {
    pub const ALL: [Delimiter; 4] = [
        Delimiter::Comma,
        Delimiter::Semicolon,
        Delimiter::Tab,
        Delimiter::Pipe,
    ];

    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
            Delimiter::Pipe => b'|',
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Delimiter::Comma => ", (comma)",
            Delimiter::Semicolon => "; (semicolon)",
            Delimiter::Tab => "\\t (tab)",
            Delimiter::Pipe => "| (pipe)",
        }
    }
}

/// Text encoding of the uploaded bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextEncoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "latin-1")]
    Latin1,
    #[serde(rename = "cp1252")]
    Windows1252,
}

impl TextEncoding {
    pub const ALL: [TextEncoding; 3] = [
        TextEncoding::Utf8,
        TextEncoding::Latin1,
        TextEncoding::Windows1252,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "cp1252",
        }
    }
}

/// How to turn an upload into rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub delimiter: Delimiter,
    pub encoding: TextEncoding,
    /// Row (after skipping) holding the column names; `None` = no header.
    pub header_row: Option<usize>,
    /// Leading records dropped before anything else is read.
    pub skip_rows: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Comma,
            encoding: TextEncoding::Utf8,
            header_row: Some(0),
            skip_rows: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse an uploaded CSV payload into a [`Dataset`].
///
/// Every failure (bad encoding, malformed quoting, ragged rows, missing
/// header) is reported as [`ExploreError::Parse`].
pub fn load_csv(payload: &[u8], options: &ParseOptions) -> Result<Dataset, ExploreError> {
    parse_payload(payload, options).map_err(|e| ExploreError::Parse(format!("{e:#}")))
}

fn parse_payload(payload: &[u8], options: &ParseOptions) -> Result<Dataset> {
    let text = decode(payload, options.encoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    for (rec_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV record {}", rec_no + 1))?;
        if record.len() <= 1 && record.iter().all(str::is_empty) {
            continue;
        }
        records.push(record);
    }

    if records.len() <= options.skip_rows {
        bail!("No columns to parse from file");
    }
    let mut rows = records.into_iter().skip(options.skip_rows);

    let headers: Vec<String> = match options.header_row {
        Some(k) => {
            let header = rows
                .nth(k)
                .with_context(|| format!("header row {k} is past the end of the file"))?;
            unique_headers(header.iter())
        }
        None => Vec::new(),
    };
    let data: Vec<csv::StringRecord> = rows.collect();

    let headers = if options.header_row.is_none() {
        let width = data.first().map(|r| r.len()).context("No columns to parse from file")?;
        (0..width).map(|i| i.to_string()).collect()
    } else {
        headers
    };
    let width = headers.len();

    for (row_no, record) in data.iter().enumerate() {
        if record.len() != width {
            bail!(
                "row {}: expected {width} fields, found {}",
                row_no + 1,
                record.len()
            );
        }
    }

    let mut fields = Vec::with_capacity(width);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(width);
    for (col_idx, name) in headers.iter().enumerate() {
        let cells: Vec<Option<&str>> = data.iter().map(|r| non_null(&r[col_idx])).collect();
        let kind = infer_type(&cells);
        fields.push(Field::new(name, kind.data_type(), true));
        columns.push(build_array(kind, &cells));
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)
        .context("assembling columns")?;
    Ok(Dataset::new(batch))
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn decode(payload: &[u8], encoding: TextEncoding) -> Result<Cow<'_, str>> {
    match encoding {
        TextEncoding::Utf8 => {
            let bytes = payload.strip_prefix(UTF8_BOM).unwrap_or(payload);
            UTF_8
                .decode_without_bom_handling_and_without_replacement(bytes)
                .context("payload is not valid utf-8; try another encoding")
        }
        TextEncoding::Latin1 => Ok(encoding_rs::mem::decode_latin1(payload)),
        TextEncoding::Windows1252 => WINDOWS_1252
            .decode_without_bom_handling_and_without_replacement(payload)
            .context("payload is not valid cp1252; try another encoding"),
    }
}

// ---------------------------------------------------------------------------
// Header and type inference helpers
// ---------------------------------------------------------------------------

/// Blank names become `Unnamed: i`; repeats get `.1`, `.2`, ... suffixes.
fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (i, name) in raw.enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name.to_string()
        };
        let mut candidate = base.clone();
        let mut suffix = 1;
        while out.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}

fn non_null(cell: &str) -> Option<&str> {
    if NULL_MARKERS.contains(&cell.trim()) {
        None
    } else {
        Some(cell)
    }
}

/// Integer only when every cell is a whole number and none is missing;
/// whole numbers with gaps become floats.
fn infer_type(cells: &[Option<&str>]) -> ColumnType {
    let present: Vec<&str> = cells.iter().flatten().map(|s| s.trim()).collect();
    if present.is_empty() {
        return ColumnType::Float;
    }
    let has_nulls = present.len() < cells.len();
    if !has_nulls && present.iter().all(|s| s.parse::<i64>().is_ok()) {
        return ColumnType::Integer;
    }
    if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        return ColumnType::Float;
    }
    ColumnType::Text
}

fn build_array(kind: ColumnType, cells: &[Option<&str>]) -> ArrayRef {
    match kind {
        ColumnType::Integer => Arc::new(Int64Array::from(
            cells
                .iter()
                .map(|c| c.and_then(|s| s.trim().parse::<i64>().ok()))
                .collect::<Vec<_>>(),
        )),
        ColumnType::Float => Arc::new(Float64Array::from(
            cells
                .iter()
                .map(|c| c.and_then(|s| s.trim().parse::<f64>().ok()))
                .collect::<Vec<_>>(),
        )),
        ColumnType::Text => Arc::new(StringArray::from(cells.to_vec())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn load(text: &str) -> Dataset {
        load_csv(text.as_bytes(), &ParseOptions::default()).expect("load")
    }

    #[test]
    fn counts_rows_and_columns_from_header() {
        let ds = load("a,b,c\n1,2,3\n4,5,6\n7,8,9\n");
        assert_eq!(ds.num_rows(), 3);
        assert_eq!(ds.num_columns(), 3);
        assert_eq!(ds.column_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn infers_column_types() {
        let ds = load("id,price,name\n1,2.5,apple\n2,3,pear\n");
        assert_eq!(ds.column_type(0), ColumnType::Integer);
        assert_eq!(ds.column_type(1), ColumnType::Float);
        assert_eq!(ds.column_type(2), ColumnType::Text);
        assert_eq!(ds.cell(1, 1), CellValue::Float(3.0));
    }

    #[test]
    fn whole_numbers_with_gaps_become_floats() {
        let ds = load("age\n10\n\n20\nNA\n");
        assert_eq!(ds.column_type(0), ColumnType::Float);
        assert_eq!(ds.num_rows(), 3);
        assert_eq!(ds.cell(2, 0), CellValue::Null);
    }

    #[test]
    fn all_null_column_is_float() {
        let ds = load("a,b\n1,\n2,\n");
        assert_eq!(ds.column_type(1), ColumnType::Float);
        assert_eq!(ds.null_count(1), 2);
    }

    #[test]
    fn skip_rows_and_header_index_apply_in_order() {
        let text = "junk line\nnotes,here\nx,y\n1,2\n3,4\n";
        let options = ParseOptions {
            skip_rows: 1,
            header_row: Some(1),
            ..ParseOptions::default()
        };
        let ds = load_csv(text.as_bytes(), &options).unwrap();
        assert_eq!(ds.column_names(), vec!["x", "y"]);
        assert_eq!(ds.num_rows(), 2);
    }

    #[test]
    fn no_header_numbers_the_columns() {
        let options = ParseOptions {
            delimiter: Delimiter::Semicolon,
            header_row: None,
            ..ParseOptions::default()
        };
        let ds = load_csv(b"1;2\n3;4\n", &options).unwrap();
        assert_eq!(ds.column_names(), vec!["0", "1"]);
        assert_eq!(ds.num_rows(), 2);
    }

    #[test]
    fn duplicate_and_blank_headers_are_renamed() {
        let ds = load("a,a,,a\n1,2,3,4\n");
        assert_eq!(ds.column_names(), vec!["a", "a.1", "Unnamed: 2", "a.2"]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = load_csv(b"a,b\n1,2\n3\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ExploreError::Parse(ref msg) if msg.contains("row 2")));
    }

    #[test]
    fn empty_payload_is_a_parse_error() {
        let err = load_csv(b"", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ExploreError::Parse(_)));
    }

    #[test]
    fn invalid_utf8_is_rejected_but_latin1_decodes() {
        let bytes = b"city\nM\xe1laga\n";
        let err = load_csv(bytes, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, ExploreError::Parse(ref msg) if msg.contains("utf-8")));

        let options = ParseOptions {
            encoding: TextEncoding::Latin1,
            ..ParseOptions::default()
        };
        let ds = load_csv(bytes, &options).unwrap();
        assert_eq!(ds.cell(0, 0), CellValue::Text("Málaga".into()));
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let ds = load("\u{feff}name\nx\n");
        assert_eq!(ds.column_names(), vec!["name"]);
    }

    #[test]
    fn quoted_fields_keep_delimiters() {
        let ds = load("name,note\n\"Doe, Jane\",\"said \"\"hi\"\"\"\n");
        assert_eq!(ds.cell(0, 0), CellValue::Text("Doe, Jane".into()));
        assert_eq!(ds.cell(0, 1), CellValue::Text("said \"hi\"".into()));
    }

    #[test]
    fn parse_options_deserialize_with_defaults() {
        let options: ParseOptions =
            serde_json::from_str(r#"{"delimiter":"tab","encoding":"latin-1"}"#).unwrap();
        assert_eq!(options.delimiter, Delimiter::Tab);
        assert_eq!(options.encoding, TextEncoding::Latin1);
        assert_eq!(options.header_row, Some(0));
        assert_eq!(options.skip_rows, 0);
    }

    #[test]
    fn windows_1252_maps_euro_sign() {
        let options = ParseOptions {
            encoding: TextEncoding::Windows1252,
            ..ParseOptions::default()
        };
        let ds = load_csv(b"sym\n\x80\n", &options).unwrap();
        assert_eq!(ds.cell(0, 0), CellValue::Text("€".into()));
    }

    #[test]
    fn header_row_past_the_end_is_rejected() {
        let options = ParseOptions {
            header_row: Some(5),
            ..ParseOptions::default()
        };
        let err = load_csv(b"a,b\n1,2\n", &options).unwrap_err();
        assert!(matches!(err, ExploreError::Parse(ref msg) if msg.contains("header row 5")));
    }

    #[test]
    fn skipping_every_record_is_rejected() {
        let options = ParseOptions {
            skip_rows: 2,
            ..ParseOptions::default()
        };
        let err = load_csv(b"a,b\n1,2\n", &options).unwrap_err();
        assert!(matches!(err, ExploreError::Parse(_)));
    }
}
