//! quant-loader: schema-governed uploads of spreadsheets into the warehouse

mod cli;
mod config;
mod tabular;
mod upload;
mod warehouse;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    cli::run(cli).await
}
