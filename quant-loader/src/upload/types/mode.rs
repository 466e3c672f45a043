//! Upload modes

use serde::{Deserialize, Serialize};

/// How an upload treats the destination table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Add rows to whatever is already there
    #[default]
    Append,
    /// Clear existing rows (after confirmation) before inserting
    Overwrite,
    /// Create the table without asking if it does not exist
    Create,
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadMode::Append => write!(f, "append"),
            UploadMode::Overwrite => write!(f, "overwrite"),
            UploadMode::Create => write!(f, "create"),
        }
    }
}

impl std::str::FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "append" => Ok(UploadMode::Append),
            "overwrite" => Ok(UploadMode::Overwrite),
            "create" => Ok(UploadMode::Create),
            other => Err(format!(
                "unknown upload mode '{}', expected append, overwrite or create",
                other
            )),
        }
    }
}
