//! Command-line interface

pub mod commands;
mod context;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use context::AppContext;

use commands::drop::DropCommands;
use commands::query::QueryCommands;
use commands::upload::UploadCommands;

#[derive(Parser)]
#[command(name = "quant-loader", version, about = "Schema-governed uploads into the quant warehouse")]
pub struct Cli {
    /// Config file (defaults to ~/.config/quant-loader/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a spreadsheet or CSV file into a table
    Upload(UploadCommands),
    /// Drop a table (best effort)
    Drop(DropCommands),
    /// Run a read query and print or export the result
    Query(QueryCommands),
    /// List governed schemas and their column standards
    Schemas,
}

pub async fn run(cli: Cli) -> Result<()> {
    let ctx = AppContext::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Upload(args) => commands::upload::handle_upload_command(&ctx, args).await,
        Commands::Drop(args) => commands::drop::handle_drop_command(&ctx, args).await,
        Commands::Query(args) => commands::query::handle_query_command(&ctx, args).await,
        Commands::Schemas => commands::schemas::handle_schemas_command(&ctx),
    }
}
