//! Registry of governed schemas and their column contracts

use std::collections::BTreeMap;

use crate::upload::error::UploadError;

/// Schema that bypasses standards unless configured otherwise
pub const DEFAULT_ESCAPE_HATCH: &str = "dbo";

/// Column contract of a governed schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStandard {
    schema_name: String,
    required_columns: Vec<String>,
    primary_key: Vec<String>,
}

/// Error building a schema standard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Primary-key column is not among the required columns
    PrimaryKeyNotRequired { schema: String, column: String },
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::PrimaryKeyNotRequired { schema, column } => write!(
                f,
                "primary key column '{}' of schema '{}' is not a required column",
                column, schema
            ),
        }
    }
}

impl std::error::Error for RegistryError {}

impl SchemaStandard {
    /// Build a standard. Every primary-key column must also be required.
    pub fn new<S: Into<String>>(
        schema_name: impl Into<String>,
        required_columns: impl IntoIterator<Item = S>,
        primary_key: impl IntoIterator<Item = S>,
    ) -> Result<Self, RegistryError> {
        let schema_name = schema_name.into();
        let required_columns: Vec<String> = required_columns.into_iter().map(Into::into).collect();
        let primary_key: Vec<String> = primary_key.into_iter().map(Into::into).collect();

        if let Some(column) = primary_key.iter().find(|pk| !required_columns.contains(pk)) {
            return Err(RegistryError::PrimaryKeyNotRequired {
                schema: schema_name,
                column: column.clone(),
            });
        }

        Ok(Self {
            schema_name,
            required_columns,
            primary_key,
        })
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn required_columns(&self) -> &[String] {
        &self.required_columns
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Required columns absent from `columns`, in contract order.
    /// Membership only, position is irrelevant here.
    pub fn missing_columns(&self, columns: &[String]) -> Vec<String> {
        self.required_columns
            .iter()
            .filter(|required| !columns.contains(required))
            .cloned()
            .collect()
    }
}

/// Result of looking a schema up in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardLookup<'a> {
    Governed(&'a SchemaStandard),
    EscapeHatch,
}

/// Immutable set of governed schemas plus the escape-hatch schema
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    standards: BTreeMap<String, SchemaStandard>,
    escape_hatch: String,
}

impl SchemaRegistry {
    pub fn new(standards: Vec<SchemaStandard>, escape_hatch: impl Into<String>) -> Self {
        Self {
            standards: standards
                .into_iter()
                .map(|s| (s.schema_name.clone(), s))
                .collect(),
            escape_hatch: escape_hatch.into(),
        }
    }

    /// Registry with the built-in `pricing`, `ops` and `revenue` contracts
    pub fn builtin() -> Self {
        Self::new(builtin_standards(), DEFAULT_ESCAPE_HATCH)
    }

    /// Look up a schema. Unknown schemas fail fast.
    pub fn lookup(&self, schema_name: &str) -> Result<StandardLookup<'_>, UploadError> {
        if let Some(standard) = self.standards.get(schema_name) {
            return Ok(StandardLookup::Governed(standard));
        }

        if schema_name == self.escape_hatch {
            return Ok(StandardLookup::EscapeHatch);
        }

        Err(UploadError::UnknownSchema {
            schema: schema_name.to_string(),
            known: self.schema_names().into_iter().map(String::from).collect(),
        })
    }

    /// Governed standards in name order
    pub fn schemas(&self) -> impl Iterator<Item = &SchemaStandard> {
        self.standards.values()
    }

    pub fn escape_hatch(&self) -> &str {
        &self.escape_hatch
    }

    /// Every schema name the registry knows, escape hatch last
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.standards.keys().map(String::as_str).collect();
        if !self.standards.contains_key(&self.escape_hatch) {
            names.push(&self.escape_hatch);
        }
        names
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_standards() -> Vec<SchemaStandard> {
    let defs: [(&str, &[&str], &[&str]); 3] = [
        (
            "pricing",
            &[
                "product_id",
                "region",
                "price_date",
                "currency",
                "list_price",
                "net_price",
                "discount_pct",
                "price_tier",
                "source_system",
                "update_timestamp",
                "update_user",
            ],
            &["product_id", "region", "price_date"],
        ),
        (
            "ops",
            &[
                "site_id",
                "metric_date",
                "metric_name",
                "metric_value",
                "unit",
                "update_timestamp",
                "update_user",
            ],
            &["site_id", "metric_date", "metric_name"],
        ),
        (
            "revenue",
            &[
                "account_id",
                "period",
                "revenue_type",
                "amount",
                "currency",
                "update_timestamp",
                "update_user",
            ],
            &["account_id", "period", "revenue_type"],
        ),
    ];

    defs.into_iter()
        .map(|(name, required, pk)| {
            SchemaStandard::new(name, required.iter().copied(), pk.iter().copied())
                .unwrap_or_else(|e| panic!("built-in standard is malformed: {}", e))
        })
        .collect()
}
