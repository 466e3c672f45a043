//! Read a worksheet into a dataset
//!
//! The first row holds column names; every following non-empty row is data.

use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto};

use crate::upload::types::value::parse_timestamp;
use crate::upload::types::{Dataset, Value};

/// Read one worksheet (the first unless `sheet` names another)
pub fn read_excel(path: &Path, sheet: Option<&str>) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_name = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                bail!(
                    "Sheet '{}' not found in {} (available: {})",
                    name,
                    path.display(),
                    workbook.sheet_names().join(", ")
                );
            }
            name.to_string()
        }
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .context("Excel file has no sheets")?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", sheet_name))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|c| c.to_string()).collect(),
        None => return Ok(Dataset::default()),
    };

    let data: Vec<Vec<Value>> = rows
        .filter(|row| !row.iter().all(|c| matches!(c, Data::Empty)))
        .map(|row| row.iter().map(cell_to_value).collect())
        .collect();

    log::debug!(
        "Read {} rows x {} columns from sheet '{}'",
        data.len(),
        headers.len(),
        sheet_name
    );

    super::super::build_dataset(headers, data)
        .with_context(|| format!("Failed to load sheet '{}' of {}", sheet_name, path.display()))
}

/// Convert an Excel cell to a dataset value
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => match s.to_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Text(s.clone()),
        },
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => {
            // Excel stores every number as a float; whole numbers come back as integers
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                Value::Int(*f as i64)
            } else {
                Value::Float(*f)
            }
        }
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(Value::Timestamp)
            .unwrap_or(Value::Null),
        Data::DateTimeIso(s) => parse_timestamp(s)
            .map(Value::Timestamp)
            .unwrap_or_else(|| Value::Text(s.clone())),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::excel::write_excel;
    use crate::upload::types::{Column, ColumnType};

    fn temp_file(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name))
    }

    #[test]
    fn test_cell_to_value() {
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(cell_to_value(&Data::String(String::new())), Value::Null);
        assert_eq!(cell_to_value(&Data::String("TRUE".into())), Value::Bool(true));
        assert_eq!(cell_to_value(&Data::Float(3.0)), Value::Int(3));
        assert_eq!(cell_to_value(&Data::Float(3.25)), Value::Float(3.25));
        assert_eq!(
            cell_to_value(&Data::DateTimeIso("2024-02-29T10:00:00".into())),
            Value::Timestamp(
                chrono::NaiveDate::from_ymd_opt(2024, 2, 29)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_read_written_workbook() {
        let path = temp_file("revenue.xlsx");
        let dataset = Dataset::new(vec![
            Column::inferred("account_id", vec![Value::Int(7), Value::Int(8)]),
            Column::inferred("amount", vec![Value::Float(10.5), Value::Float(2.25)]),
            Column::inferred("currency", vec![Value::from("USD"), Value::Null]),
        ])
        .unwrap();
        write_excel(&dataset, &path).unwrap();

        let read = read_excel(&path, None).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(read.column_names(), vec!["account_id", "amount", "currency"]);
        assert_eq!(read.column("account_id").unwrap().kind, ColumnType::Integer);
        assert_eq!(read.column("amount").unwrap().kind, ColumnType::Float);
        assert_eq!(read.column("currency").unwrap().values[1], Value::Null);
    }

    #[test]
    fn test_missing_sheet_is_reported() {
        let path = temp_file("sheets.xlsx");
        let dataset =
            Dataset::new(vec![Column::inferred("a", vec![Value::Int(1)])]).unwrap();
        write_excel(&dataset, &path).unwrap();

        let err = read_excel(&path, Some("Nope")).unwrap_err();
        let _ = std::fs::remove_file(&path);

        assert!(err.to_string().contains("Sheet 'Nope' not found"));
    }
}
