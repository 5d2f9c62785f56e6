use std::io::Read;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::enrich::enrich;
use super::error::{DataLoadError, Result};
use super::model::{BookingRecord, EnrichedDataset, Hotel};

/// Columns every source must provide, in the order cells are handed to
/// [`record_from_cells`].
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "hotel",
    "is_canceled",
    "arrival_date_year",
    "arrival_date_month",
    "adults",
    "children",
    "babies",
    "stays_in_weekend_nights",
    "stays_in_week_nights",
    "country",
    "adr",
    "total_of_special_requests",
];

/// Tokens treated as a missing value, following the usual CSV export
/// conventions of the booking data.
const NULL_TOKENS: [&str; 7] = ["", "NA", "N/A", "NULL", "NaN", "nan", "null"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and enrich a booking dataset. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the required column names (recommended)
/// * `.json`    – `[{ "hotel": "Resort Hotel", "adults": 2, ... }, ...]`
/// * `.parquet` – flat Parquet file with the required columns
pub fn load_file(path: &Path) -> Result<EnrichedDataset> {
    let raw = read_records(path)?;
    let dataset = enrich(raw);
    log::info!(
        "Loaded {} bookings from {} ({} dropped)",
        dataset.len(),
        path.display(),
        dataset.dropped_rows
    );
    Ok(dataset)
}

/// Read raw booking rows without deriving anything.
pub fn read_records(path: &Path) -> Result<Vec<BookingRecord>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(|e| DataLoadError::io(path, e))?;
            read_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path).map_err(|e| DataLoadError::io(path, e))?;
            read_json(&text)
        }
        "parquet" | "pq" => {
            let file = std::fs::File::open(path).map_err(|e| DataLoadError::io(path, e))?;
            read_parquet(file)
        }
        other => Err(DataLoadError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Cell – a single loosely typed source value
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    fn from_text(s: &str) -> Cell {
        let s = s.trim();
        if NULL_TOKENS.contains(&s) {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Cell::Float(f);
        }
        match s {
            "true" | "True" | "TRUE" => Cell::Bool(true),
            "false" | "False" | "FALSE" => Cell::Bool(false),
            _ => Cell::Text(s.to_string()),
        }
    }

    fn render(&self) -> String {
        match self {
            Cell::Null => "<null>".into(),
            Cell::Bool(b) => b.to_string(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell → BookingRecord
// ---------------------------------------------------------------------------

fn invalid(row: usize, column: &'static str, cell: &Cell) -> DataLoadError {
    DataLoadError::InvalidValue {
        row,
        column,
        value: cell.render(),
    }
}

fn optional_count(row: usize, column: &'static str, cell: &Cell) -> Result<Option<u32>> {
    match cell {
        Cell::Null => Ok(None),
        Cell::Integer(i) => u32::try_from(*i)
            .map(Some)
            .map_err(|_| invalid(row, column, cell)),
        Cell::Float(f) if f.is_nan() => Ok(None),
        Cell::Float(f) if *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64 => {
            Ok(Some(*f as u32))
        }
        _ => Err(invalid(row, column, cell)),
    }
}

fn required_count(row: usize, column: &'static str, cell: &Cell) -> Result<u32> {
    optional_count(row, column, cell)?.ok_or_else(|| invalid(row, column, cell))
}

fn flag(row: usize, column: &'static str, cell: &Cell) -> Result<bool> {
    match cell {
        Cell::Bool(b) => Ok(*b),
        Cell::Integer(0) => Ok(false),
        Cell::Integer(1) => Ok(true),
        Cell::Float(f) if *f == 0.0 => Ok(false),
        Cell::Float(f) if *f == 1.0 => Ok(true),
        _ => Err(invalid(row, column, cell)),
    }
}

fn real(row: usize, column: &'static str, cell: &Cell) -> Result<f64> {
    match cell {
        Cell::Integer(i) => Ok(*i as f64),
        Cell::Float(f) if f.is_finite() => Ok(*f),
        _ => Err(invalid(row, column, cell)),
    }
}

fn year(cell: &Cell) -> Option<i32> {
    match cell {
        Cell::Integer(i) => i32::try_from(*i).ok(),
        Cell::Float(f) if f.fract() == 0.0 => Some(*f as i32),
        _ => None,
    }
}

fn text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Null => None,
        Cell::Text(s) => Some(s.clone()),
        other => Some(other.render()),
    }
}

/// Build a raw record from cells laid out in [`REQUIRED_COLUMNS`] order.
///
/// Malformed arrival components are not an error; they surface later as a
/// null arrival date.
fn record_from_cells(row: usize, cells: &[Cell]) -> Result<BookingRecord> {
    let hotel = match &cells[0] {
        Cell::Text(s) => Hotel::parse(s).ok_or_else(|| invalid(row, "hotel", &cells[0]))?,
        other => return Err(invalid(row, "hotel", other)),
    };

    Ok(BookingRecord {
        hotel,
        is_canceled: flag(row, "is_canceled", &cells[1])?,
        arrival_year: year(&cells[2]),
        arrival_month: text(&cells[3]),
        adults: optional_count(row, "adults", &cells[4])?,
        children: optional_count(row, "children", &cells[5])?,
        babies: optional_count(row, "babies", &cells[6])?,
        stays_weekend_nights: required_count(row, "stays_in_weekend_nights", &cells[7])?,
        stays_week_nights: required_count(row, "stays_in_week_nights", &cells[8])?,
        country: text(&cells[9]),
        adr: real(row, "adr", &cells[10])?,
        total_special_requests: required_count(row, "total_of_special_requests", &cells[11])?,
    })
}

fn missing_columns(present: impl Fn(&str) -> bool) -> Option<DataLoadError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !present(c))
        .map(|c| c.to_string())
        .collect();
    (!missing.is_empty()).then_some(DataLoadError::MissingColumns(missing))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names. Extra columns are ignored.
pub fn read_csv<R: Read>(source: R) -> Result<Vec<BookingRecord>> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if let Some(err) = missing_columns(|c| headers.iter().any(|h| h == c)) {
        return Err(err);
    }
    let indices: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|c| headers.iter().position(|h| h == c))
        .collect();

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cells: Vec<Cell> = indices
            .iter()
            .map(|&i| Cell::from_text(record.get(i).unwrap_or("")))
            .collect();
        records.push(record_from_cells(row_no, &cells)?);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "hotel": "Resort Hotel", "is_canceled": 0, "adults": 2, ... },
///   ...
/// ]
/// ```
///
/// A key absent from one object is a null; a key absent from every object is
/// a missing column.
pub fn read_json(text: &str) -> Result<Vec<BookingRecord>> {
    let rows: Vec<serde_json::Map<String, JsonValue>> = serde_json::from_str(text)?;

    if !rows.is_empty() {
        if let Some(err) = missing_columns(|c| rows.iter().any(|obj| obj.contains_key(c))) {
            return Err(err);
        }
    }

    rows.iter()
        .enumerate()
        .map(|(i, obj)| {
            let cells: Vec<Cell> = REQUIRED_COLUMNS
                .iter()
                .map(|c| obj.get(*c).map(json_to_cell).unwrap_or(Cell::Null))
                .collect();
            record_from_cells(i, &cells)
        })
        .collect()
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::from_text(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, e.g. written by Pandas (`df.to_parquet()`) or
/// Polars (`df.write_parquet()`). Integer, float, boolean and string columns
/// are accepted for any required field.
pub fn read_parquet(file: std::fs::File) -> Result<Vec<BookingRecord>> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    if let Some(err) = missing_columns(|c| schema.index_of(c).is_ok()) {
        return Err(err);
    }
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns: Vec<&ArrayRef> = REQUIRED_COLUMNS
            .iter()
            .map(|c| batch.schema().index_of(c).map(|i| batch.column(i)))
            .collect::<std::result::Result<_, _>>()?;

        for row in 0..batch.num_rows() {
            let cells: Vec<Cell> = columns.iter().map(|col| extract_cell(col, row)).collect();
            records.push(record_from_cells(records.len(), &cells)?);
        }
    }
    Ok(records)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    match col.data_type() {
        DataType::Utf8 => Cell::from_text(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Cell::from_text(col.as_string::<i64>().value(row)),
        DataType::Boolean => Cell::Bool(col.as_boolean().value(row)),
        DataType::Int8 => Cell::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => Cell::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => Cell::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => Cell::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => Cell::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => Cell::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => Cell::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v).map_or(Cell::Float(v as f64), Cell::Integer)
        }
        DataType::Float32 => Cell::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Float(col.as_primitive::<Float64Type>().value(row)),
        other => Cell::Text(format!("{other:?}")),
    }
}
