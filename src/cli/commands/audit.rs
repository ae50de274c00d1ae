//! `qat audit` command - Audit log

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{opt, print_json, truncate_str, Session};
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// Show the most recent audit entries, newest first
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Number of entries to show
    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: usize,
}

pub fn run(cmd: AuditCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AuditCommands::List(args) => run_list(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let entries = session.store.list_audit(args.limit).into_diagnostic()?;

    let format = session.format(global);
    if format == OutputFormat::Json {
        return print_json(&entries);
    }

    let mut table = Table::new(&["ID", "WHEN", "ACTOR", "ACTION", "KIND", "ENTITY", "DETAIL"]);
    for entry in &entries {
        table.push(vec![
            entry.id.to_string(),
            entry.created_at.format("%Y-%m-%d %H:%M").to_string(),
            entry.actor.clone(),
            entry.action.clone(),
            entry.entity_kind.clone(),
            opt(&entry.entity_id),
            truncate_str(&entry.detail.to_string(), 60),
        ]);
    }
    table.print(format, "audit entry", global.quiet);
    Ok(())
}
