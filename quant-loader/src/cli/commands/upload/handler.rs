use anyhow::{Context, Result};
use colored::*;
use is_terminal::IsTerminal;

use super::UploadCommands;
use crate::cli::AppContext;
use crate::tabular::load_dataset;
use crate::upload::{
    AutoConfirm, Confirm, DeclineAll, PromptConfirm, TableIdentifier, UploadRequest, Uploader,
    WriteKind,
};

pub async fn handle_upload_command(ctx: &AppContext, args: UploadCommands) -> Result<()> {
    let table = TableIdentifier::parse(&args.table)?;

    let dataset = load_dataset(&args.file, args.sheet.as_deref())
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    println!(
        "Loaded {} rows x {} columns from {}",
        dataset.row_count(),
        dataset.column_count(),
        args.file.display().to_string().cyan()
    );

    let confirm = select_confirm(args.yes);

    let mut request = UploadRequest::new(table, args.mode);
    if args.skip_standards || !ctx.config.standards.enforce {
        request = request.without_standards();
    }

    let uploader = Uploader::new(&ctx.warehouse, &ctx.registry, confirm.as_ref(), &ctx.principal);
    let summary = uploader.upload(dataset, &request).await?;

    let verb = match summary.write_kind() {
        WriteKind::Append => "appended to",
        WriteKind::Overwrite => "written to",
    };
    if summary.ungoverned {
        println!(
            "{} {} is not governed by a column standard",
            "Warning:".yellow().bold(),
            summary.table.schema()
        );
    }
    if summary.created {
        println!("Created table {}", summary.table.to_string().bright_green());
    }
    println!(
        "{} {} rows {} {}",
        "Upload complete:".bright_green().bold(),
        summary.rows_inserted,
        verb,
        summary.table.to_string().bold()
    );

    Ok(())
}

/// `--yes` wins; otherwise prompt on a terminal and decline everything when piped
fn select_confirm(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AutoConfirm)
    } else if std::io::stdin().is_terminal() {
        Box::new(PromptConfirm)
    } else {
        log::debug!("stdin is not a terminal, confirmations will be declined");
        Box::new(DeclineAll)
    }
}
