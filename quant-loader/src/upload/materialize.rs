//! Derive a table definition from a dataset's shape

use crate::upload::error::UploadError;
use crate::upload::statement::{ColumnDefinition, CreateTable};
use crate::upload::types::{ColumnType, Dataset, TableIdentifier};

/// Storage type for text and anything without a better mapping
pub const DEFAULT_STORAGE_TYPE: &str = "NVARCHAR(100)";

/// Map a semantic column type onto the warehouse type.
///
/// Total: object-like columns fall back to bounded text instead of failing.
pub fn storage_type(kind: ColumnType) -> &'static str {
    match kind {
        ColumnType::Integer => "BIGINT",
        ColumnType::Float => "FLOAT",
        ColumnType::Timestamp => "DATETIME",
        ColumnType::Boolean => "BIT",
        ColumnType::Text | ColumnType::Mixed => DEFAULT_STORAGE_TYPE,
    }
}

/// Describe the table that would hold `dataset`.
///
/// Every primary-key column must be a dataset column. Key columns are
/// declared `NOT NULL` and listed in the given order.
pub fn materialize(
    table: &TableIdentifier,
    dataset: &Dataset,
    primary_key: Option<&[String]>,
) -> Result<CreateTable, UploadError> {
    if let Some(pk) = primary_key {
        if let Some(missing) = pk.iter().find(|c| !dataset.has_column(c)) {
            return Err(UploadError::InvalidPrimaryKey {
                column: missing.clone(),
            });
        }
    }

    let is_key = |name: &str| primary_key.is_some_and(|pk| pk.iter().any(|c| c == name));

    let columns = dataset
        .columns()
        .iter()
        .map(|c| ColumnDefinition {
            name: c.name.clone(),
            storage_type: storage_type(c.kind),
            nullable: !is_key(&c.name),
        })
        .collect();

    Ok(CreateTable {
        table: table.clone(),
        columns,
        primary_key: primary_key.filter(|pk| !pk.is_empty()).map(|pk| pk.to_vec()),
    })
}
