//! `qat defect` command - Defect queries

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{format_date, opt, print_json, truncate_str, Session};
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{DefectStatus, Severity, TargetFilter};
use crate::entities::EntityKind;
use crate::import::ReferenceIndex;

#[derive(Subcommand, Debug)]
pub enum DefectCommands {
    /// List defects
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only defects of this project (id, code or name)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Only defects in this status (new, open, assigned, fixed, ...)
    #[arg(long, short = 's')]
    pub status: Option<DefectStatus>,

    /// Only defects of this severity (critical, high, medium, low)
    #[arg(long)]
    pub severity: Option<Severity>,

    /// Show at most this many
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

pub fn run(cmd: DefectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DefectCommands::List(args) => run_list(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project_id = match &args.project {
        Some(reference) => Some(session.project(reference)?.id),
        None => None,
    };

    let filter = TargetFilter {
        project_id,
        status: args.status.map(|s| s.to_string()),
        severity: args.severity.map(|s| s.to_string()),
        limit: args.limit,
        ..Default::default()
    };
    let defects = session.store.list_defects(&filter).into_diagnostic()?;

    let format = session.format(global);
    if format == OutputFormat::Json {
        return print_json(&defects);
    }

    let index = ReferenceIndex::build(&session.store, EntityKind::Defect).into_diagnostic()?;
    let mut table = Table::new(&[
        "ID", "PROJECT", "CODE", "TITLE", "SEVERITY", "STATUS", "ASSIGNEE", "DUE",
    ]);
    for defect in &defects {
        let f = &defect.fields;
        table.push(vec![
            defect.id.to_string(),
            index
                .project_by_id(f.project_id)
                .map(|p| p.code.clone())
                .unwrap_or_default(),
            f.defect_id_code.clone(),
            truncate_str(&f.title, 40),
            opt(&f.severity),
            opt(&f.status),
            f.assigned_to_id
                .and_then(|id| index.user_by_id(id))
                .map(|u| u.email.clone())
                .unwrap_or_default(),
            f.due_date.as_ref().map(format_date).unwrap_or_default(),
        ]);
    }
    table.print(format, "defect", global.quiet);
    Ok(())
}
