//! Warehouse transport
//!
//! The upload engine only talks to these traits. `SqliteWarehouse` is the
//! production transport; tests use the in-memory recorder in `memory`.

pub mod sqlite;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::upload::statement::{InsertRows, Statement};
use crate::upload::types::{Dataset, ExistingTableMetadata, TableIdentifier, Value};

pub use sqlite::SqliteWarehouse;

/// Failure reported by the transport
#[derive(Debug)]
pub struct WarehouseError {
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl WarehouseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for WarehouseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {}", self.message, source),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for WarehouseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Hands out connections, one per logical operation
#[async_trait]
pub trait Warehouse: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn WarehouseConnection>, WarehouseError>;
}

/// A live connection. Statements are committed as they execute.
#[async_trait]
pub trait WarehouseConnection: Send {
    /// Columns of `table` in ordinal order; empty when the table is absent
    async fn table_columns(
        &mut self,
        table: &TableIdentifier,
    ) -> Result<ExistingTableMetadata, WarehouseError>;

    /// Execute a parameterless statement, returning affected rows
    async fn execute(&mut self, statement: &Statement) -> Result<u64, WarehouseError>;

    /// Insert every row positionally as one batch
    async fn insert_rows(
        &mut self,
        insert: &InsertRows,
        rows: Vec<Vec<Value>>,
    ) -> Result<u64, WarehouseError>;

    /// Run a read query and return the result set
    async fn query(&mut self, sql: &str) -> Result<Dataset, WarehouseError>;

    /// Release the connection
    async fn close(self: Box<Self>);
}
