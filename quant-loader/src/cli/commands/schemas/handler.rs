use anyhow::Result;
use colored::*;

use crate::cli::AppContext;

pub fn handle_schemas_command(ctx: &AppContext) -> Result<()> {
    for standard in ctx.registry.schemas() {
        println!("{}", standard.schema_name().bright_cyan().bold());
        println!("  required:    {}", standard.required_columns().join(", "));
        if standard.primary_key().is_empty() {
            println!("  primary key: {}", "(none)".dimmed());
        } else {
            println!("  primary key: {}", standard.primary_key().join(", "));
        }
    }

    println!(
        "{} {}",
        ctx.registry.escape_hatch().yellow().bold(),
        "(ungoverned, uploads are accepted with a warning)".dimmed()
    );
    if !ctx.config.standards.enforce {
        println!("{}", "Standards enforcement is disabled in the config".yellow());
    }

    Ok(())
}
