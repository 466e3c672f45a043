//! Positional reconciliation of dataset columns against an existing table
//!
//! Inserts bind values by position, so an existing table only accepts a
//! dataset whose columns match it name-for-name at every index.

use crate::upload::error::{ColumnMismatch, PositionMismatch};
use crate::upload::types::ExistingTableMetadata;

/// What the orchestrator should do with the destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Table does not exist yet
    NeedsCreate,
    /// Table exists and its columns line up with the dataset
    ProceedWithInsert,
}

/// Compare incoming column names with the existing table.
///
/// Reports every mismatched position, not only the first one.
pub fn reconcile(
    existing: &ExistingTableMetadata,
    incoming_columns: &[String],
) -> Result<Decision, ColumnMismatch> {
    if !existing.exists() {
        return Ok(Decision::NeedsCreate);
    }

    let existing_names = existing.column_names();

    if existing_names.len() != incoming_columns.len() {
        return Err(ColumnMismatch::Count {
            incoming: incoming_columns.len(),
            existing: existing_names.len(),
        });
    }

    let mismatches: Vec<PositionMismatch> = existing_names
        .iter()
        .zip(incoming_columns)
        .enumerate()
        .filter(|(_, (expected, actual))| **expected != actual.as_str())
        .map(|(i, (expected, actual))| PositionMismatch {
            position: i + 1,
            expected: expected.to_string(),
            actual: actual.clone(),
        })
        .collect();

    if !mismatches.is_empty() {
        return Err(ColumnMismatch::Names(mismatches));
    }

    Ok(Decision::ProceedWithInsert)
}
