//! In-memory tabular dataset

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Semantic type of a dataset column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Timestamp,
    Boolean,
    /// Object-like column whose values disagree on type (or carry none)
    Mixed,
}

impl ColumnType {
    /// Infer the column type from its values.
    ///
    /// Nulls are ignored, integers widen to floats when both appear, and any
    /// other disagreement yields `Mixed`.
    pub fn infer(values: &[Value]) -> Self {
        let mut inferred: Option<ColumnType> = None;

        for value in values.iter().filter(|v| !v.is_null()) {
            let current = match value {
                Value::Null => continue,
                Value::Text(_) => ColumnType::Text,
                Value::Int(_) => ColumnType::Integer,
                Value::Float(_) => ColumnType::Float,
                Value::Timestamp(_) => ColumnType::Timestamp,
                Value::Bool(_) => ColumnType::Boolean,
            };

            inferred = Some(match (inferred, current) {
                (None, t) => t,
                (Some(a), b) if a == b => a,
                (Some(ColumnType::Integer), ColumnType::Float)
                | (Some(ColumnType::Float), ColumnType::Integer) => ColumnType::Float,
                _ => return ColumnType::Mixed,
            });
        }

        inferred.unwrap_or(ColumnType::Mixed)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Text => write!(f, "text"),
            ColumnType::Integer => write!(f, "integer"),
            ColumnType::Float => write!(f, "float"),
            ColumnType::Timestamp => write!(f, "timestamp"),
            ColumnType::Boolean => write!(f, "boolean"),
            ColumnType::Mixed => write!(f, "mixed"),
        }
    }
}

/// A named, typed column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Build a column whose type is inferred from its values
    pub fn inferred(name: impl Into<String>, values: Vec<Value>) -> Self {
        let kind = ColumnType::infer(&values);
        Self::new(name, kind, values)
    }
}

/// Error constructing or extending a dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    /// Column length differs from the rest of the dataset
    RaggedColumns {
        column: String,
        expected: usize,
        actual: usize,
    },
    /// Two columns share a name
    DuplicateColumn { column: String },
}

impl std::fmt::Display for DatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::RaggedColumns {
                column,
                expected,
                actual,
            } => write!(
                f,
                "column '{}' has {} values, expected {}",
                column, actual, expected
            ),
            DatasetError::DuplicateColumn { column } => {
                write!(f, "column '{}' appears more than once", column)
            }
        }
    }
}

impl std::error::Error for DatasetError {}

/// Ordered collection of equal-length columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    /// Build a dataset, enforcing equal column lengths and unique names
    pub fn new(columns: Vec<Column>) -> Result<Self, DatasetError> {
        let mut dataset = Self::default();
        for column in columns {
            dataset.push_column(column)?;
        }
        Ok(dataset)
    }

    /// Append a column at the end
    pub fn push_column(&mut self, column: Column) -> Result<(), DatasetError> {
        if self.has_column(&column.name) {
            return Err(DatasetError::DuplicateColumn {
                column: column.name,
            });
        }

        if let Some(first) = self.columns.first() {
            let (expected, actual) = (first.values.len(), column.values.len());
            if expected != actual {
                return Err(DatasetError::RaggedColumns {
                    column: column.name,
                    expected,
                    actual,
                });
            }
        }

        self.columns.push(column);
        Ok(())
    }

    /// Append a column holding the same value in every row
    pub fn push_constant(
        &mut self,
        name: &str,
        kind: ColumnType,
        value: Value,
    ) -> Result<(), DatasetError> {
        let values = vec![value; self.row_count()];
        self.push_column(Column::new(name, kind, values))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column names in dataset order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    /// Row-major copy of the data, missing values normalized to `Value::Null`
    pub fn rows(&self) -> Vec<Vec<Value>> {
        (0..self.row_count())
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| c.values[row].clone().normalized())
                    .collect()
            })
            .collect()
    }
}
