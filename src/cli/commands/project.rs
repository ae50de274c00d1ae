//! `qat project` command - Project management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::helpers::{format_date, opt, print_json, truncate_str, Session};
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Create a project
    Add(AddArgs),

    /// List projects
    List,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Short unique code, referenced by import files (e.g. WEB)
    #[arg(long)]
    pub code: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: Option<String>,
}

pub fn run(cmd: ProjectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProjectCommands::Add(args) => run_add(args, global),
        ProjectCommands::List => run_list(global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let project = session
        .store
        .create_project(args.code.trim(), args.name.trim(), args.description.as_deref())
        .map_err(|e| miette::miette!("Cannot create project '{}': {}", args.code, e))?;

    let actor = session.config.author();
    session
        .store
        .record_audit(
            &actor,
            "create",
            "project",
            Some(project.id),
            &json!({ "code": project.code, "name": project.name }),
        )
        .into_diagnostic()?;

    if session.format(global) == OutputFormat::Json {
        return print_json(&project);
    }
    if !global.quiet {
        println!(
            "{} Created project {} {}",
            style("✓").green(),
            style(&project.code).cyan(),
            style(format!("#{}", project.id)).dim()
        );
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let projects = session.store.list_projects().into_diagnostic()?;

    let format = session.format(global);
    if format == OutputFormat::Json {
        return print_json(&projects);
    }

    let mut table = Table::new(&["ID", "CODE", "NAME", "DESCRIPTION", "CREATED"]);
    for project in &projects {
        table.push(vec![
            project.id.to_string(),
            project.code.clone(),
            project.name.clone(),
            truncate_str(&opt(&project.description), 40),
            format_date(&project.created_at),
        ]);
    }
    table.print(format, "project", global.quiet);
    Ok(())
}
