use anyhow::Result;
use colored::*;

use super::DropCommands;
use crate::cli::AppContext;
use crate::upload::{AutoConfirm, DropOutcome, TableIdentifier, Uploader};

/// A failed drop is reported but does not fail the command
pub async fn handle_drop_command(ctx: &AppContext, args: DropCommands) -> Result<()> {
    let table = TableIdentifier::parse(&args.table)?;

    let uploader = Uploader::new(&ctx.warehouse, &ctx.registry, &AutoConfirm, &ctx.principal);
    match uploader.drop_table(&table).await? {
        DropOutcome::Dropped => {
            println!("Table {} deleted", table.to_string().bright_green());
        }
        DropOutcome::Failed(err) => {
            println!(
                "{} could not delete {}: {}",
                "Warning:".yellow().bold(),
                table,
                err.message()
            );
        }
    }

    Ok(())
}
