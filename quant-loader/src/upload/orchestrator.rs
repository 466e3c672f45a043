//! Upload orchestration
//!
//! Start → MetadataEnriched → StandardsChecked → ExistenceChecked →
//! {Created | Validated} → ClearedOrSkipped → Inserted → Done.
//!
//! Every validation runs before the first row is written. The existence
//! check and the later mutations are separate round trips, so two uploaders
//! racing on one table can both see it missing; callers must not run
//! concurrent uploads against the same table.

use chrono::{NaiveDateTime, Utc};

use crate::upload::confirm::Confirm;
use crate::upload::enrich::enrich;
use crate::upload::error::UploadError;
use crate::upload::identity::Principal;
use crate::upload::materialize::materialize;
use crate::upload::reconcile::{Decision, reconcile};
use crate::upload::registry::{SchemaRegistry, StandardLookup};
use crate::upload::statement::{InsertRows, Statement};
use crate::upload::types::{Dataset, TableIdentifier, UploadMode};
use crate::warehouse::{Warehouse, WarehouseConnection, WarehouseError};

/// Progress of an upload, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Start,
    MetadataEnriched,
    StandardsChecked,
    ExistenceChecked,
    Created,
    Validated,
    ClearedOrSkipped,
    Inserted,
    Done,
}

/// What to upload where
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub table: TableIdentifier,
    pub mode: UploadMode,
    pub enforce_standards: bool,
}

impl UploadRequest {
    pub fn new(table: TableIdentifier, mode: UploadMode) -> Self {
        Self {
            table,
            mode,
            enforce_standards: true,
        }
    }

    pub fn without_standards(mut self) -> Self {
        self.enforce_standards = false;
        self
    }
}

/// Whether existing rows were replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Append,
    Overwrite,
}

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub table: TableIdentifier,
    pub rows_inserted: u64,
    pub created: bool,
    pub cleared: bool,
    /// Written to the escape-hatch schema without any standard applied
    pub ungoverned: bool,
}

impl UploadSummary {
    pub fn write_kind(&self) -> WriteKind {
        if self.cleared {
            WriteKind::Overwrite
        } else {
            WriteKind::Append
        }
    }
}

/// Result of checking a dataset against its schema's standard
#[derive(Debug, Clone, PartialEq, Eq)]
enum Governance {
    Governed { primary_key: Vec<String> },
    Ungoverned,
    Skipped,
}

impl Governance {
    fn primary_key(&self) -> Option<&[String]> {
        match self {
            Governance::Governed { primary_key } => Some(primary_key.as_slice()),
            Governance::Ungoverned | Governance::Skipped => None,
        }
    }
}

/// Outcome of a best-effort drop
#[derive(Debug)]
pub enum DropOutcome {
    Dropped,
    Failed(WarehouseError),
}

/// Coordinates enrichment, standards, reconciliation and writes
pub struct Uploader<'a> {
    warehouse: &'a dyn Warehouse,
    registry: &'a SchemaRegistry,
    confirm: &'a dyn Confirm,
    principal: &'a Principal,
}

impl<'a> Uploader<'a> {
    pub fn new(
        warehouse: &'a dyn Warehouse,
        registry: &'a SchemaRegistry,
        confirm: &'a dyn Confirm,
        principal: &'a Principal,
    ) -> Self {
        Self {
            warehouse,
            registry,
            confirm,
            principal,
        }
    }

    /// Upload `dataset` to `request.table`, stamping the current time
    pub async fn upload(
        &self,
        dataset: Dataset,
        request: &UploadRequest,
    ) -> Result<UploadSummary, UploadError> {
        self.upload_at(dataset, request, Utc::now().naive_utc()).await
    }

    /// Upload with an explicit capture time for the audit columns
    pub async fn upload_at(
        &self,
        dataset: Dataset,
        request: &UploadRequest,
        captured_at: NaiveDateTime,
    ) -> Result<UploadSummary, UploadError> {
        let table = &request.table;
        log::info!(
            "Uploading {} rows to {} ({})",
            dataset.row_count(),
            table,
            request.mode
        );
        transition(table, UploadStage::Start);

        let dataset = enrich(dataset, self.principal, captured_at)?;
        transition(table, UploadStage::MetadataEnriched);

        let governance = if request.enforce_standards {
            self.check_standards(table, &dataset)?
        } else {
            Governance::Skipped
        };
        transition(table, UploadStage::StandardsChecked);

        let mut conn = self.warehouse.connect().await?;
        let result = self
            .write(conn.as_mut(), &dataset, request, governance.primary_key())
            .await;
        conn.close().await;

        let mut summary = result?;
        summary.ungoverned = governance == Governance::Ungoverned;
        transition(table, UploadStage::Done);
        Ok(summary)
    }

    /// Drop a table. Failures are reported, never escalated.
    pub async fn drop_table(&self, table: &TableIdentifier) -> Result<DropOutcome, UploadError> {
        let mut conn = self.warehouse.connect().await?;
        let outcome = match conn.execute(&Statement::DropTable(table.clone())).await {
            Ok(_) => {
                log::info!("Table {} deleted successfully", table);
                DropOutcome::Dropped
            }
            Err(e) => {
                log::warn!("Failed to delete table {}: {}", table, e);
                DropOutcome::Failed(e)
            }
        };
        conn.close().await;
        Ok(outcome)
    }

    /// Run a read query on a fresh connection
    pub async fn query(&self, sql: &str) -> Result<Dataset, UploadError> {
        let mut conn = self.warehouse.connect().await?;
        let result = conn.query(sql).await;
        conn.close().await;
        Ok(result?)
    }

    /// Validate against the schema's standard. The escape hatch warns on
    /// every use.
    fn check_standards(
        &self,
        table: &TableIdentifier,
        dataset: &Dataset,
    ) -> Result<Governance, UploadError> {
        match self.registry.lookup(table.schema())? {
            StandardLookup::Governed(standard) => {
                let missing = standard.missing_columns(&dataset.column_names());
                if !missing.is_empty() {
                    return Err(UploadError::MissingRequiredColumns {
                        schema: standard.schema_name().to_string(),
                        missing,
                    });
                }
                Ok(Governance::Governed {
                    primary_key: standard.primary_key().to_vec(),
                })
            }
            StandardLookup::EscapeHatch => {
                log::warn!(
                    "Uploading to ungoverned schema '{}': no column standards are enforced for {}",
                    table.schema(),
                    table
                );
                Ok(Governance::Ungoverned)
            }
        }
    }

    async fn write(
        &self,
        conn: &mut dyn WarehouseConnection,
        dataset: &Dataset,
        request: &UploadRequest,
        primary_key: Option<&[String]>,
    ) -> Result<UploadSummary, UploadError> {
        let table = &request.table;

        let existing = conn.table_columns(table).await?;
        transition(table, UploadStage::ExistenceChecked);

        let created = match reconcile(&existing, &dataset.column_names())? {
            Decision::NeedsCreate => {
                let approved = request.mode == UploadMode::Create
                    || self.confirm.confirm(&format!(
                        "Table '{}' does not exist. Create it?",
                        table
                    ));
                if !approved {
                    return Err(UploadError::CreationDeclined {
                        table: table.to_string(),
                    });
                }

                let create = materialize(table, dataset, primary_key)?;
                conn.execute(&Statement::CreateTable(create)).await?;
                log::info!("Created new table: {}", table);
                transition(table, UploadStage::Created);
                true
            }
            Decision::ProceedWithInsert => {
                transition(table, UploadStage::Validated);
                false
            }
        };

        // Declining the clear falls back to appending rather than aborting
        let cleared = request.mode == UploadMode::Overwrite
            && self
                .confirm
                .confirm(&format!("Confirm overwriting all rows in '{}'?", table));
        if cleared {
            let removed = conn.execute(&Statement::DeleteAll(table.clone())).await?;
            log::info!("All previous data in {} cleared ({} rows)", table, removed);
        } else if request.mode == UploadMode::Overwrite {
            log::info!("Overwrite of {} not confirmed, appending instead", table);
        }
        transition(table, UploadStage::ClearedOrSkipped);

        let insert = InsertRows {
            table: table.clone(),
            columns: dataset.column_names(),
        };
        let rows_inserted = conn.insert_rows(&insert, dataset.rows()).await?;
        transition(table, UploadStage::Inserted);

        Ok(UploadSummary {
            table: table.clone(),
            rows_inserted,
            created,
            cleared,
            ungoverned: false,
        })
    }
}

fn transition(table: &TableIdentifier, stage: UploadStage) {
    log::debug!("Upload {} -> {:?}", table, stage);
}
