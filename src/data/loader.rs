use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Genre, MovieDataset, MovieRecord};
use super::schema::Schema;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a movie rating dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.xls` – comma-separated text with a header row (the `.xls`
///   files produced by the rating exports are plain CSV)
/// * `.tsv`          – tab-separated text with a header row
/// * `.json`         – `[{ "title": ..., "year": ..., ... }, ...]`
/// * `.parquet`      – one column per field
///
/// `genres` restricts the genre columns read; `None` takes every known
/// genre column present in the file.
pub fn load_file(path: &Path, genres: Option<&[Genre]>) -> Result<MovieDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "xls" | "txt" => load_delimited(path, b',', genres),
        "tsv" => load_delimited(path, b'\t', genres),
        "json" => load_json(path, genres),
        "parquet" | "pq" => load_parquet(path, genres),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::debug!(
        "{}: {} records, {} years, {} tags, genres {:?}",
        path.display(),
        dataset.len(),
        dataset.years.len(),
        dataset.tags.len(),
        dataset.genres
    );
    Ok(dataset)
}

/// Collects decoded records and builds the dataset once the source is drained.
struct DatasetBuilder {
    schema: Schema,
    records: Vec<MovieRecord>,
}

impl DatasetBuilder {
    fn new(headers: &[String], genres: Option<&[Genre]>) -> Result<Self> {
        let schema = Schema::resolve(headers, genres)?;
        Ok(Self {
            schema,
            records: Vec::new(),
        })
    }

    fn push_row(&mut self, row: usize, cells: &[CellValue]) -> Result<()> {
        let record = self.schema.decode_row(row, cells)?;
        self.records.push(record);
        Ok(())
    }

    fn finish(self) -> MovieDataset {
        MovieDataset::new(
            self.records,
            self.schema.genres(),
            self.schema.has_month(),
            self.schema.has_day_of_week(),
        )
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per line. Columns the schema
/// does not know about (e.g. a Pandas index column) are ignored.
fn load_delimited(path: &Path, delimiter: u8, genres: Option<&[Genre]>) -> Result<MovieDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut builder = DatasetBuilder::new(&headers, genres)?;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells: Vec<CellValue> = record.iter().map(text_cell).collect();
        builder.push_row(row_no, &cells)?;
    }

    Ok(builder.finish())
}

/// Text cells stay as written; the schema decides per column whether to read
/// a number out of them.
fn text_cell(s: &str) -> CellValue {
    if s.trim().is_empty() {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "Heat (1995)", "year": 1995, "rating": 4.0, "rating_count": 12,
///     "tag": null, "Action": 1, "Crime": 1 },
///   ...
/// ]
/// ```
///
/// A key absent from a row reads as null.
fn load_json(path: &Path, genres: Option<&[Genre]>) -> Result<MovieDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("Expected top-level JSON array")?;

    let objects = rows
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            rec.as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))
        })
        .collect::<Result<Vec<_>>>()?;

    // Header is the union of keys across all rows.
    let mut position: BTreeMap<&str, usize> = BTreeMap::new();
    let mut headers: Vec<String> = Vec::new();
    for obj in &objects {
        for key in obj.keys() {
            if !position.contains_key(key.as_str()) {
                position.insert(key.as_str(), headers.len());
                headers.push(key.clone());
            }
        }
    }

    let mut builder = DatasetBuilder::new(&headers, genres)?;

    for (i, obj) in objects.iter().enumerate() {
        let mut cells = vec![CellValue::Null; headers.len()];
        for (key, val) in obj.iter() {
            if let Some(&idx) = position.get(key.as_str()) {
                cells[idx] = json_to_cell(val);
            }
        }
        builder.push_row(i, &cells)?;
    }

    Ok(builder.finish())
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => text_cell(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, genres: Option<&[Genre]>) -> Result<MovieDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let mut dataset = DatasetBuilder::new(&headers, genres)?;

    let reader = builder.build().context("building parquet reader")?;
    let mut row_no = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let columns = batch.columns();

        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row_no}"))?;
            dataset.push_row(row_no, &cells)?;
            row_no += 1;
        }
    }

    Ok(dataset.finish())
}

/// Extract a single cell from an Arrow column at a given row.
///
/// Types without a direct mapping (small ints, dictionaries, timestamps…)
/// go through Arrow's display formatter and are decoded from text.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Utf8 => Some(text_cell(col.as_string::<i32>().value(row))),
        DataType::LargeUtf8 => Some(text_cell(col.as_string::<i64>().value(row))),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };

    match cell {
        Some(cell) => Ok(cell),
        None => {
            let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())
                .with_context(|| format!("unsupported column type {:?}", col.data_type()))?;
            Ok(text_cell(&formatter.value(row).to_string()))
        }
    }
}
