//! Query command

mod handler;

use std::path::PathBuf;

use clap::{Args, ValueEnum};

pub use handler::handle_query_command;

#[derive(Args)]
pub struct QueryCommands {
    /// SQL to run, e.g. "SELECT * FROM [pricing].[daily_prices]"
    pub query: Option<String>,

    /// Read the query from a file instead
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output format for printed results
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Save results to a file; .xlsx and .csv are written as tables
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
    JsonCompact,
}
