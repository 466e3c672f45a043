use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::*;

use super::{OutputFormat, QueryCommands};
use crate::cli::AppContext;
use crate::tabular::{self, csv::to_csv_string};
use crate::upload::{AutoConfirm, Dataset, Uploader, Value};

pub async fn handle_query_command(ctx: &AppContext, args: QueryCommands) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    let sql = read_query(args.query, args.file.as_deref())?;
    log::debug!("Query: {}", sql);

    let start = Instant::now();
    let uploader = Uploader::new(&ctx.warehouse, &ctx.registry, &AutoConfirm, &ctx.principal);
    let dataset = uploader.query(&sql).await.context("Failed to execute query")?;
    log::debug!(
        "Query returned {} rows in {:.2}ms",
        dataset.row_count(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    match args.output {
        Some(path) if is_table_file(&path) => {
            tabular::save_dataset(&dataset, &path)?;
            println!(
                "{} rows saved to {}",
                dataset.row_count(),
                path.display().to_string().bright_green()
            );
        }
        Some(path) => {
            let formatted = format_output(&dataset, args.format)?;
            fs::write(&path, formatted)
                .with_context(|| format!("Failed to write output to: {}", path.display()))?;
            println!("Results saved to {}", path.display().to_string().bright_green());
        }
        None => println!("{}", format_output(&dataset, args.format)?),
    }

    Ok(())
}

/// Exactly one of the inline query and the query file must be given
fn read_query(query: Option<String>, file: Option<&Path>) -> Result<String> {
    match (query, file) {
        (Some(_), Some(_)) => anyhow::bail!("Cannot specify both query string and --file option"),
        (None, None) => {
            anyhow::bail!("Either provide a query string or use --file to specify a query file")
        }
        (Some(query), None) => Ok(query),
        (None, Some(path)) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read query file: {}", path.display()))?;
            let trimmed = content.trim();
            if trimmed.is_empty() {
                anyhow::bail!("Query file is empty: {}", path.display());
            }
            Ok(trimmed.to_string())
        }
    }
}

fn is_table_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

fn format_output(dataset: &Dataset, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(dataset)),
        OutputFormat::Csv => to_csv_string(dataset),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&to_json(dataset)).context("Failed to format JSON output")
        }
        OutputFormat::JsonCompact => {
            serde_json::to_string(&to_json(dataset)).context("Failed to format JSON output")
        }
    }
}

/// One object per row, keys in column order
fn to_json(dataset: &Dataset) -> serde_json::Value {
    let names = dataset.column_names();
    let rows = dataset
        .rows()
        .into_iter()
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = names
                .iter()
                .cloned()
                .zip(row.iter().map(Value::to_json))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();
    serde_json::Value::Array(rows)
}

fn render_table(dataset: &Dataset) -> String {
    if dataset.column_count() == 0 {
        return "No data".to_string();
    }

    let header = dataset.column_names();
    let cells: Vec<Vec<String>> = dataset
        .rows()
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| match v {
                    Value::Null => "NULL".to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: &[String]| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![
        line(header.as_slice()).bold().to_string(),
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-"),
    ];
    out.extend(cells.iter().map(|row| line(row.as_slice())));
    out.push(format!("({} rows)", cells.len()));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::Column;

    fn sample() -> Dataset {
        Dataset::new(vec![
            Column::inferred("site_id", vec![Value::from("AMS1"), Value::from("FRA2")]),
            Column::inferred("metric_value", vec![Value::Float(0.5), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_read_query_requires_exactly_one_source() {
        assert!(read_query(None, None).is_err());
        assert!(read_query(Some("SELECT 1".into()), Some(Path::new("q.sql"))).is_err());
        assert_eq!(read_query(Some("SELECT 1".into()), None).unwrap(), "SELECT 1");
    }

    #[test]
    fn test_json_keeps_column_order_and_nulls() {
        let json = format_output(&sample(), OutputFormat::JsonCompact).unwrap();
        assert_eq!(
            json,
            r#"[{"site_id":"AMS1","metric_value":0.5},{"site_id":"FRA2","metric_value":null}]"#
        );
    }

    #[test]
    fn test_table_pads_columns() {
        colored::control::set_override(false);
        let table = render_table(&sample());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "site_id | metric_value");
        assert_eq!(lines[1], "--------+-------------");
        assert_eq!(lines[2], "AMS1    | 0.5");
        assert_eq!(lines[3], "FRA2    | NULL");
        assert_eq!(lines[4], "(2 rows)");
    }

    #[test]
    fn test_table_output_extensions() {
        assert!(is_table_file(Path::new("out.XLSX")));
        assert!(is_table_file(Path::new("out.csv")));
        assert!(!is_table_file(Path::new("out.json")));
    }
}
