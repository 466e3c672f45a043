//! Upload failures

use crate::upload::types::DatasetError;
use crate::warehouse::WarehouseError;

/// One column whose name differs from the existing table at the same index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionMismatch {
    /// 1-based column position
    pub position: usize,
    /// Name in the existing table
    pub expected: String,
    /// Name in the incoming dataset
    pub actual: String,
}

/// Why incoming columns do not line up with an existing table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMismatch {
    Count { incoming: usize, existing: usize },
    Names(Vec<PositionMismatch>),
}

impl std::fmt::Display for ColumnMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnMismatch::Count { incoming, existing } => write!(
                f,
                "column count mismatch: dataset has {}, table has {}",
                incoming, existing
            ),
            ColumnMismatch::Names(mismatches) => {
                write!(f, "column name mismatch:")?;
                for m in mismatches {
                    write!(
                        f,
                        "\n  position {}: dataset = '{}' vs table = '{}'",
                        m.position, m.actual, m.expected
                    )?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ColumnMismatch {}

/// Error aborting an upload (or any warehouse operation)
#[derive(Debug)]
pub enum UploadError {
    /// Identifier is not of the form `schema.table`
    InvalidIdentifier { input: String },
    /// Schema is neither governed nor the escape hatch
    UnknownSchema { schema: String, known: Vec<String> },
    /// Governed schema requires columns the dataset lacks
    MissingRequiredColumns {
        schema: String,
        missing: Vec<String>,
    },
    /// Dataset columns do not line up with the existing table
    SchemaMismatch(ColumnMismatch),
    /// A primary-key column is absent from the dataset
    InvalidPrimaryKey { column: String },
    /// Table does not exist and creation was not confirmed
    CreationDeclined { table: String },
    /// The dataset itself is malformed
    InvalidDataset(DatasetError),
    /// The warehouse could not be reached or rejected a statement
    Connectivity(WarehouseError),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadError::InvalidIdentifier { input } => write!(
                f,
                "invalid table identifier '{}', expected '<schema>.<table>'",
                input
            ),
            UploadError::UnknownSchema { schema, known } => write!(
                f,
                "schema '{}' has no registered standard (known schemas: {})",
                schema,
                known.join(", ")
            ),
            UploadError::MissingRequiredColumns { schema, missing } => write!(
                f,
                "dataset is missing columns required by schema '{}': {}",
                schema,
                missing.join(", ")
            ),
            UploadError::SchemaMismatch(mismatch) => write!(f, "{}", mismatch),
            UploadError::InvalidPrimaryKey { column } => {
                write!(f, "primary key column '{}' is not in the dataset", column)
            }
            UploadError::CreationDeclined { table } => write!(
                f,
                "table '{}' does not exist and creation was cancelled",
                table
            ),
            UploadError::InvalidDataset(err) => write!(f, "invalid dataset: {}", err),
            UploadError::Connectivity(err) => write!(f, "warehouse error: {}", err),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::SchemaMismatch(mismatch) => Some(mismatch),
            UploadError::InvalidDataset(err) => Some(err),
            UploadError::Connectivity(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ColumnMismatch> for UploadError {
    fn from(mismatch: ColumnMismatch) -> Self {
        UploadError::SchemaMismatch(mismatch)
    }
}

impl From<DatasetError> for UploadError {
    fn from(err: DatasetError) -> Self {
        UploadError::InvalidDataset(err)
    }
}

impl From<WarehouseError> for UploadError {
    fn from(err: WarehouseError) -> Self {
        UploadError::Connectivity(err)
    }
}
