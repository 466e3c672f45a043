//! Metadata of tables already present in the warehouse

/// One column of an existing table, in ordinal order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingColumn {
    pub name: String,
    pub declared_type: String,
}

impl ExistingColumn {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// Columns of an existing table. Empty means the table does not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExistingTableMetadata {
    pub columns: Vec<ExistingColumn>,
}

impl ExistingTableMetadata {
    pub fn new(columns: Vec<ExistingColumn>) -> Self {
        Self { columns }
    }

    pub fn exists(&self) -> bool {
        !self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
