//! CSV reading operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, DataType}};
use serde_json::{json, Value};

use crate::PipelineError;

/// Reads a CSV file from `path` into a Polars DataFrame, inferring column types.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a CSV file with every column kept as text, so codes keep their leading zeros.
pub(crate) fn read_csv_as_strings(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads only the first `n_rows` rows of a CSV file.
pub(crate) fn read_csv_head(path: &Path, n_rows: usize) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_n_rows(Some(n_rows))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV head from {:?}", path))
}

/// Column names of `df`, in file order.
pub(crate) fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|name| name.to_string()).collect()
}

/// Error with a column listing unless `df` has a column called `name`.
pub(crate) fn require_column(df: &DataFrame, table: &'static str, name: &str) -> Result<()> {
    if df.column(name).is_err() {
        return Err(PipelineError::MissingColumn {
            table,
            column: name.to_string(),
            available: column_names(df),
        }.into());
    }
    Ok(())
}

/// Values of a column as trimmed text; blank cells become `None`.
pub(crate) fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df.column(name)?.cast(&DataType::String)
        .with_context(|| format!("[io::csv::read] column '{name}' cannot be read as text"))?;
    Ok(column.str()?.into_iter()
        .map(|cell| cell.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect())
}

/// Like [`string_column`], but `None` when the column does not exist.
pub(crate) fn optional_string_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<String>>>> {
    if df.column(name).is_err() { return Ok(None) }
    string_column(df, name).map(Some)
}

/// Values of a column as JSON, keeping the type Polars inferred.
/// Non-finite floats become `null`.
pub(crate) fn json_column(df: &DataFrame, name: &str) -> Result<Vec<Value>> {
    let column = df.column(name)?;
    let values = match column.dtype() {
        DataType::String => column.str()?.into_iter()
            .map(|v| v.map(|s| json!(s)).unwrap_or(Value::Null))
            .collect(),
        DataType::Boolean => column.bool()?.into_iter()
            .map(|v| v.map(|b| json!(b)).unwrap_or(Value::Null))
            .collect(),
        DataType::Int64 => column.i64()?.into_iter()
            .map(|v| v.map(|n| json!(n)).unwrap_or(Value::Null))
            .collect(),
        DataType::Float64 => column.f64()?.into_iter()
            .map(|v| v.filter(|f| f.is_finite()).map(|f| json!(f)).unwrap_or(Value::Null))
            .collect(),
        _ => {
            let text = column.cast(&DataType::String)?;
            let values: Vec<Value> = text.str()?.into_iter()
                .map(|v| v.map(|s| json!(s)).unwrap_or(Value::Null))
                .collect();
            values
        }
    };
    Ok(values)
}
