//! Audit columns stamped onto every upload

use chrono::NaiveDateTime;

use crate::upload::identity::Principal;
use crate::upload::types::{ColumnType, Dataset, DatasetError, Value};

pub const UPDATE_TIMESTAMP_COLUMN: &str = "update_timestamp";
pub const UPDATE_USER_COLUMN: &str = "update_user";

/// Append `update_timestamp` and `update_user` when the dataset lacks them.
///
/// Existing audit columns are left untouched, so enriching twice is a no-op.
pub fn enrich(
    mut dataset: Dataset,
    principal: &Principal,
    captured_at: NaiveDateTime,
) -> Result<Dataset, DatasetError> {
    if !dataset.has_column(UPDATE_TIMESTAMP_COLUMN) {
        dataset.push_constant(
            UPDATE_TIMESTAMP_COLUMN,
            ColumnType::Timestamp,
            Value::Timestamp(captured_at),
        )?;
    }

    if !dataset.has_column(UPDATE_USER_COLUMN) {
        dataset.push_constant(
            UPDATE_USER_COLUMN,
            ColumnType::Text,
            Value::Text(principal.name().to_string()),
        )?;
    }

    Ok(dataset)
}
