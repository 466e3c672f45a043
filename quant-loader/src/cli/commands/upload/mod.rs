//! Upload command

mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::upload::UploadMode;

pub use handler::handle_upload_command;

#[derive(Args)]
pub struct UploadCommands {
    /// Spreadsheet (.xlsx, .xls, .ods) or CSV file to upload
    pub file: PathBuf,

    /// Destination table as <schema>.<table>
    #[arg(short, long)]
    pub table: String,

    /// How to treat an existing table
    #[arg(short, long, value_enum, default_value_t = UploadMode::Append)]
    pub mode: UploadMode,

    /// Worksheet to read (first sheet when omitted)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Do not check the schema's column standards
    #[arg(long)]
    pub skip_standards: bool,
}
