//! SQLite warehouse transport
//!
//! Every schema lives in its own database file under the data directory and
//! is attached under the schema's name, so `[pricing].[daily_prices]`
//! resolves the same way it would on the production server.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as _, Row, Sqlite, TypeInfo, ValueRef};

use super::{Warehouse, WarehouseConnection, WarehouseError};
use crate::upload::statement::{InsertRows, Statement};
use crate::upload::types::value::parse_timestamp;
use crate::upload::types::{
    Column, Dataset, ExistingColumn, ExistingTableMetadata, TableIdentifier, Value, quote_ident,
};

const MAIN_DATABASE: &str = "main.db";
const MAX_CONNECTIONS: u32 = 4;

/// Warehouse backed by a directory of SQLite files
pub struct SqliteWarehouse {
    pool: SqlitePool,
    data_dir: PathBuf,
}

impl SqliteWarehouse {
    /// Prepare a warehouse rooted at `data_dir`. No connection is opened
    /// until the first operation asks for one.
    pub fn open(data_dir: &Path, connect_timeout: Duration) -> Result<Self, WarehouseError> {
        std::fs::create_dir_all(data_dir).map_err(|e| {
            WarehouseError::with_source(
                format!("Failed to create data directory {}", data_dir.display()),
                e,
            )
        })?;

        let main = data_dir.join(MAIN_DATABASE);
        let options = SqliteConnectOptions::new()
            .filename(&main)
            .create_if_missing(true)
            .busy_timeout(connect_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(connect_timeout)
            .connect_lazy_with(options);

        log::debug!("SQLite warehouse at {}", data_dir.display());

        Ok(Self {
            pool,
            data_dir: data_dir.to_path_buf(),
        })
    }
}

#[async_trait]
impl Warehouse for SqliteWarehouse {
    async fn connect(&self) -> Result<Box<dyn WarehouseConnection>, WarehouseError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| WarehouseError::with_source("Failed to connect to warehouse", e))?;

        Ok(Box::new(SqliteWarehouseConnection {
            conn,
            data_dir: self.data_dir.clone(),
            attached: HashSet::new(),
        }))
    }
}

struct SqliteWarehouseConnection {
    conn: PoolConnection<Sqlite>,
    data_dir: PathBuf,
    attached: HashSet<String>,
}

impl SqliteWarehouseConnection {
    /// Attach `<data_dir>/<schema>.db` as `schema` unless already attached
    async fn ensure_schema(&mut self, schema: &str) -> Result<(), WarehouseError> {
        if self.attached.contains(schema) {
            return Ok(());
        }

        if !schema.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(WarehouseError::new(format!(
                "Schema name '{}' may only contain letters, digits and underscores",
                schema
            )));
        }

        let present = sqlx::query("SELECT 1 FROM pragma_database_list WHERE name = ?")
            .bind(schema)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(|e| WarehouseError::with_source("Failed to list attached schemas", e))?
            .is_some();

        if !present {
            let path = self.data_dir.join(format!("{}.db", schema));
            let sql = format!("ATTACH DATABASE ? AS {}", quote_ident(schema));
            sqlx::query(&sql)
                .bind(path.to_string_lossy().to_string())
                .execute(&mut *self.conn)
                .await
                .map_err(|e| {
                    WarehouseError::with_source(format!("Failed to attach schema '{}'", schema), e)
                })?;
            log::debug!("Attached schema {} from {}", schema, path.display());
        }

        self.attached.insert(schema.to_string());
        Ok(())
    }

    /// Attach every schema file in the data directory, for free-form queries
    async fn attach_all(&mut self) -> Result<(), WarehouseError> {
        let entries = std::fs::read_dir(&self.data_dir).map_err(|e| {
            WarehouseError::with_source(
                format!("Failed to list {}", self.data_dir.display()),
                e,
            )
        })?;

        let mut schemas: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "db"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .filter(|stem| stem != "main")
            .collect();
        schemas.sort();

        for schema in schemas {
            if let Err(e) = self.ensure_schema(&schema).await {
                log::warn!("Skipping schema file {}.db: {}", schema, e);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl WarehouseConnection for SqliteWarehouseConnection {
    async fn table_columns(
        &mut self,
        table: &TableIdentifier,
    ) -> Result<ExistingTableMetadata, WarehouseError> {
        self.ensure_schema(table.schema()).await?;

        let rows = sqlx::query("SELECT name, type FROM pragma_table_info(?, ?) ORDER BY cid")
            .bind(table.table())
            .bind(table.schema())
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| {
                WarehouseError::with_source(format!("Failed to read columns of {}", table), e)
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| WarehouseError::with_source("Malformed column metadata", e))?;
            let declared_type: String = row
                .try_get("type")
                .map_err(|e| WarehouseError::with_source("Malformed column metadata", e))?;
            columns.push(ExistingColumn::new(name, declared_type));
        }

        Ok(ExistingTableMetadata::new(columns))
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64, WarehouseError> {
        self.ensure_schema(statement.table().schema()).await?;

        let sql = statement.to_sql();
        log::debug!("Executing: {}", sql);

        let result = sqlx::query(&sql)
            .execute(&mut *self.conn)
            .await
            .map_err(|e| WarehouseError::with_source(format!("Statement failed: {}", sql), e))?;

        Ok(result.rows_affected())
    }

    async fn insert_rows(
        &mut self,
        insert: &InsertRows,
        rows: Vec<Vec<Value>>,
    ) -> Result<u64, WarehouseError> {
        if rows.is_empty() {
            return Ok(0);
        }

        self.ensure_schema(insert.table.schema()).await?;

        let sql = insert.to_sql();
        log::debug!("Inserting {} rows: {}", rows.len(), sql);

        let mut tx = sqlx::Connection::begin(&mut *self.conn)
            .await
            .map_err(|e| WarehouseError::with_source("Failed to start insert batch", e))?;

        let mut inserted = 0;
        for (index, row) in rows.into_iter().enumerate() {
            let query = row
                .into_iter()
                .fold(sqlx::query(&sql), |query, value| bind_value(query, value));

            let result = query.execute(&mut *tx).await.map_err(|e| {
                WarehouseError::with_source(format!("Insert failed at row {}", index + 1), e)
            })?;
            inserted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| WarehouseError::with_source("Failed to commit insert batch", e))?;

        Ok(inserted)
    }

    async fn query(&mut self, sql: &str) -> Result<Dataset, WarehouseError> {
        self.attach_all().await?;

        let rows = sqlx::query(sql)
            .fetch_all(&mut *self.conn)
            .await
            .map_err(|e| WarehouseError::with_source("Query failed", e))?;

        rows_to_dataset(&rows)
    }

    async fn close(self: Box<Self>) {
        log::debug!("Releasing warehouse connection");
        drop(self);
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: Value,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value.normalized() {
        Value::Null => query.bind(None::<String>),
        Value::Text(s) => query.bind(s),
        Value::Int(i) => query.bind(i),
        Value::Float(f) => query.bind(f),
        Value::Timestamp(ts) => query.bind(ts),
        Value::Bool(b) => query.bind(b),
    }
}

fn rows_to_dataset(rows: &[SqliteRow]) -> Result<Dataset, WarehouseError> {
    let Some(first) = rows.first() else {
        return Ok(Dataset::default());
    };

    let names: Vec<String> = first.columns().iter().map(|c| c.name().to_string()).collect();
    let temporal: Vec<bool> = first
        .columns()
        .iter()
        .map(|c| is_temporal(c.type_info().name()))
        .collect();
    let mut values: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); names.len()];

    for row in rows {
        for (i, column_values) in values.iter_mut().enumerate() {
            column_values.push(decode_cell(row, i, temporal[i])?);
        }
    }

    let columns = names
        .into_iter()
        .zip(values)
        .map(|(name, values)| Column::inferred(name, values))
        .collect();

    Dataset::new(columns)
        .map_err(|e| WarehouseError::with_source("Query returned an unusable result set", e))
}

/// Declared column types whose text values hold timestamps
fn is_temporal(declared: &str) -> bool {
    matches!(
        declared.to_ascii_uppercase().as_str(),
        "DATETIME" | "DATE" | "TIMESTAMP"
    )
}

/// Decode by the value's runtime storage class. Text is only read back as a
/// timestamp when the column is declared as one.
fn decode_cell(row: &SqliteRow, index: usize, temporal: bool) -> Result<Value, WarehouseError> {
    let decode_err = |e: sqlx::Error| WarehouseError::with_source(format!("Failed to decode column {}", index), e);

    let raw = row.try_get_raw(index).map_err(decode_err)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    let value = match storage_class.as_str() {
        "INTEGER" => Value::Int(row.try_get::<i64, _>(index).map_err(decode_err)?),
        "REAL" => Value::Float(row.try_get::<f64, _>(index).map_err(decode_err)?),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(index).map_err(decode_err)?;
            Value::Text(format!("<{} bytes>", bytes.len()))
        }
        _ => {
            let text: String = row.try_get(index).map_err(decode_err)?;
            match parse_timestamp(&text).filter(|_| temporal) {
                Some(ts) => Value::Timestamp(ts),
                None => Value::Text(text),
            }
        }
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::statement::{ColumnDefinition, CreateTable};

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("quant-loader-test-{}", uuid::Uuid::new_v4()))
    }

    fn table() -> TableIdentifier {
        TableIdentifier::parse("ops.site_metrics").unwrap()
    }

    fn create() -> Statement {
        Statement::CreateTable(CreateTable {
            table: table(),
            columns: vec![
                ColumnDefinition {
                    name: "site_id".to_string(),
                    storage_type: "BIGINT",
                    nullable: false,
                },
                ColumnDefinition {
                    name: "unit".to_string(),
                    storage_type: "NVARCHAR(100)",
                    nullable: true,
                },
            ],
            primary_key: Some(vec!["site_id".to_string()]),
        })
    }

    #[tokio::test]
    async fn test_missing_table_has_no_columns() {
        let dir = temp_dir();
        let warehouse = SqliteWarehouse::open(&dir, Duration::from_secs(5)).unwrap();
        let mut conn = warehouse.connect().await.unwrap();

        let metadata = conn.table_columns(&table()).await.unwrap();
        assert!(!metadata.exists());

        conn.close().await;
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_create_insert_query_round_trip() {
        let dir = temp_dir();
        let warehouse = SqliteWarehouse::open(&dir, Duration::from_secs(5)).unwrap();
        let mut conn = warehouse.connect().await.unwrap();

        conn.execute(&create()).await.unwrap();

        let metadata = conn.table_columns(&table()).await.unwrap();
        assert_eq!(metadata.column_names(), vec!["site_id", "unit"]);
        assert_eq!(metadata.columns[0].declared_type, "BIGINT");

        let insert = InsertRows {
            table: table(),
            columns: vec!["site_id".to_string(), "unit".to_string()],
        };
        let inserted = conn
            .insert_rows(
                &insert,
                vec![
                    vec![Value::Int(1), Value::from("kWh")],
                    vec![Value::Int(2), Value::Null],
                ],
            )
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let result = conn
            .query("SELECT site_id, unit FROM [ops].[site_metrics] ORDER BY site_id")
            .await
            .unwrap();
        assert_eq!(result.row_count(), 2);
        assert_eq!(
            result.rows(),
            vec![
                vec![Value::Int(1), Value::from("kWh")],
                vec![Value::Int(2), Value::Null],
            ]
        );

        let deleted = conn.execute(&Statement::DeleteAll(table())).await.unwrap();
        assert_eq!(deleted, 2);

        conn.close().await;
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_schema_persists_across_connections() {
        let dir = temp_dir();
        let warehouse = SqliteWarehouse::open(&dir, Duration::from_secs(5)).unwrap();

        let mut conn = warehouse.connect().await.unwrap();
        conn.execute(&create()).await.unwrap();
        conn.close().await;

        // A new warehouse forces fresh connections with nothing attached
        let warehouse = SqliteWarehouse::open(&dir, Duration::from_secs(5)).unwrap();
        let mut conn = warehouse.connect().await.unwrap();
        let result = conn.query("SELECT * FROM [ops].[site_metrics]").await.unwrap();
        assert_eq!(result.column_count(), 0);
        assert!(conn.table_columns(&table()).await.unwrap().exists());
        conn.execute(&Statement::DropTable(table())).await.unwrap();
        assert!(!conn.table_columns(&table()).await.unwrap().exists());
        conn.close().await;

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_date_like_text_stays_text() {
        let dir = temp_dir();
        let warehouse = SqliteWarehouse::open(&dir, Duration::from_secs(5)).unwrap();
        let mut conn = warehouse.connect().await.unwrap();

        let table = TableIdentifier::parse("revenue.periods").unwrap();
        let create = Statement::CreateTable(CreateTable {
            table: table.clone(),
            columns: vec![
                ColumnDefinition {
                    name: "period".to_string(),
                    storage_type: "NVARCHAR(100)",
                    nullable: true,
                },
                ColumnDefinition {
                    name: "update_timestamp".to_string(),
                    storage_type: "DATETIME",
                    nullable: true,
                },
            ],
            primary_key: None,
        });
        conn.execute(&create).await.unwrap();

        let stamped = chrono::NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let insert = InsertRows {
            table: table.clone(),
            columns: vec!["period".to_string(), "update_timestamp".to_string()],
        };
        conn.insert_rows(
            &insert,
            vec![vec![Value::from("2024-01-01"), Value::Timestamp(stamped)]],
        )
        .await
        .unwrap();

        let result = conn
            .query("SELECT period, update_timestamp FROM [revenue].[periods]")
            .await
            .unwrap();
        assert_eq!(
            result.rows(),
            vec![vec![Value::from("2024-01-01"), Value::Timestamp(stamped)]]
        );

        conn.close().await;
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_drop_missing_table_fails() {
        let dir = temp_dir();
        let warehouse = SqliteWarehouse::open(&dir, Duration::from_secs(5)).unwrap();
        let mut conn = warehouse.connect().await.unwrap();

        let err = conn
            .execute(&Statement::DropTable(table()))
            .await
            .unwrap_err();
        assert!(err.message().starts_with("Statement failed"));

        conn.close().await;
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_rejects_schema_unfit_for_file_name() {
        let dir = temp_dir();
        let warehouse = SqliteWarehouse::open(&dir, Duration::from_secs(5)).unwrap();
        let mut conn = warehouse.connect().await.unwrap();

        let odd = TableIdentifier::parse("ops-archive.site_metrics").unwrap();
        assert!(conn.table_columns(&odd).await.is_err());

        conn.close().await;
        let _ = std::fs::remove_dir_all(dir);
    }
}
