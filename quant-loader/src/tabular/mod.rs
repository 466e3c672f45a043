//! Tabular files in and out: spreadsheets and CSV

pub mod csv;
pub mod excel;

use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::upload::types::{Column, Dataset, Value};

pub use excel::{read_excel, write_excel};

/// Load a dataset from a spreadsheet or CSV file, chosen by extension.
///
/// `sheet` picks a worksheet by name; the first sheet is used otherwise.
pub fn load_dataset(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_excel(path, sheet),
        "csv" => {
            if sheet.is_some() {
                log::warn!("Ignoring sheet name for CSV file {}", path.display());
            }
            csv::read_csv(path)
        }
        other => bail!(
            "Unsupported file type '{}' for {}, expected .xlsx, .xls, .ods or .csv",
            other,
            path.display()
        ),
    }
}

/// Write a dataset to `.xlsx` or `.csv`, chosen by extension
pub fn save_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" => write_excel(dataset, path),
        "csv" => {
            let text = csv::to_csv_string(dataset)?;
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))
        }
        other => bail!("Cannot export to '{}', expected .xlsx or .csv", other),
    }
}

/// Assemble header names and row-major cells into a dataset
pub(crate) fn build_dataset(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Dataset> {
    for (i, header) in headers.iter().enumerate() {
        if header.trim().is_empty() {
            bail!("Column {} has an empty header", i + 1);
        }
    }

    let mut columns: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); headers.len()];
    for row in rows {
        for (i, values) in columns.iter_mut().enumerate() {
            values.push(row.get(i).cloned().unwrap_or(Value::Null));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::inferred(name, values))
        .collect();

    Dataset::new(columns).context("File does not form a valid table")
}
