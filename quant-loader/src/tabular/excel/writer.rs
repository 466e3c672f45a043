//! Write a dataset to an Excel workbook

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, Worksheet};

use crate::upload::types::{Dataset, Value};

/// Write `dataset` as a single worksheet with a bold header row
pub fn write_excel(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col, name) in dataset.column_names().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }

    for (row_idx, row) in dataset.rows().iter().enumerate() {
        let row_num = (row_idx + 1) as u32;
        for (col_idx, value) in row.iter().enumerate() {
            write_value(worksheet, row_num, col_idx as u16, value, &date_format)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    Ok(())
}

fn write_value(
    ws: &mut Worksheet,
    row: u32,
    col: u16,
    value: &Value,
    date_format: &Format,
) -> Result<()> {
    match value {
        Value::Null => { /* Leave cell empty */ }
        Value::Text(s) => { ws.write_string(row, col, s)?; }
        Value::Int(i) => { ws.write_number(row, col, *i as f64)?; }
        Value::Float(f) => { ws.write_number(row, col, *f)?; }
        Value::Bool(b) => { ws.write_boolean(row, col, *b)?; }
        Value::Timestamp(ts) => {
            let dt = ExcelDateTime::from_timestamp(ts.and_utc().timestamp())?;
            ws.write_datetime_with_format(row, col, &dt, date_format)?;
        }
    }
    Ok(())
}
