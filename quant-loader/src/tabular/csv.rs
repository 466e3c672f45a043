//! CSV import and export

use std::path::Path;

use anyhow::{Context, Result};

use crate::upload::types::{Dataset, Value};

/// Read a CSV file with a header row. Cell types are inferred per field.
pub fn read_csv(path: &Path) -> Result<Dataset> {
    let mut reader = ::csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Failed to read CSV record {} in {}", i + 1, path.display()))?;
        rows.push(record.iter().map(Value::parse_text).collect());
    }

    super::build_dataset(headers, rows)
        .with_context(|| format!("Failed to load {}", path.display()))
}

/// Render a dataset as CSV text, nulls as empty fields
pub fn to_csv_string(dataset: &Dataset) -> Result<String> {
    let mut writer = ::csv::Writer::from_writer(Vec::new());

    writer.write_record(dataset.column_names())?;
    for row in dataset.rows() {
        writer.write_record(row.iter().map(|v| match v {
            Value::Null => String::new(),
            other => other.to_string(),
        }))?;
    }

    let bytes = writer.into_inner().context("Failed to flush CSV output")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}
