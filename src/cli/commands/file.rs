//! `qat file` command - Test case files and defect files

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use std::collections::HashMap;

use crate::cli::helpers::{format_date, print_json, Session};
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::entities::EntityKind;

#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// Create a file inside a project
    Add(AddArgs),

    /// List files of one kind
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Which records the file groups
    #[arg(value_enum)]
    pub kind: EntityKind,

    /// Owning project (id, code or name)
    #[arg(long, short = 'p')]
    pub project: String,

    /// File name, unique within the project
    #[arg(long)]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[arg(value_enum)]
    pub kind: EntityKind,

    /// Only files of this project (id, code or name)
    #[arg(long, short = 'p')]
    pub project: Option<String>,
}

pub fn run(cmd: FileCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FileCommands::Add(args) => run_add(args, global),
        FileCommands::List(args) => run_list(args, global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let project = session.project(&args.project)?;

    let file = session
        .store
        .create_parent_file(args.kind, project.id, args.name.trim())
        .map_err(|e| {
            miette::miette!(
                "Cannot create {} '{}' in project '{}': {}",
                args.kind.file_label().to_lowercase(),
                args.name,
                project.code,
                e
            )
        })?;

    let actor = session.config.author();
    session
        .store
        .record_audit(
            &actor,
            "create",
            args.kind.files_table(),
            Some(file.id),
            &json!({ "name": file.name, "project": project.code }),
        )
        .into_diagnostic()?;

    if session.format(global) == OutputFormat::Json {
        return print_json(&file);
    }
    if !global.quiet {
        println!(
            "{} Created {} {} in {} {}",
            style("✓").green(),
            args.kind.file_label().to_lowercase(),
            style(&file.name).cyan(),
            style(&project.code).cyan(),
            style(format!("#{}", file.id)).dim()
        );
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project_id = match &args.project {
        Some(reference) => Some(session.project(reference)?.id),
        None => None,
    };

    let files = session
        .store
        .list_parent_files(args.kind, project_id)
        .into_diagnostic()?;

    let format = session.format(global);
    if format == OutputFormat::Json {
        return print_json(&files);
    }

    let codes: HashMap<i64, String> = session
        .store
        .list_projects()
        .into_diagnostic()?
        .into_iter()
        .map(|p| (p.id, p.code))
        .collect();

    let mut table = Table::new(&["ID", "PROJECT", "NAME", "CREATED"]);
    for file in &files {
        table.push(vec![
            file.id.to_string(),
            codes.get(&file.project_id).cloned().unwrap_or_default(),
            file.name.clone(),
            format_date(&file.created_at),
        ]);
    }
    table.print(format, &args.kind.file_label().to_lowercase(), global.quiet);
    Ok(())
}
