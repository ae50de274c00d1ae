//! `qat user` command - User management

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::helpers::{format_date, opt, print_json, Session};
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user
    Add(AddArgs),

    /// List users
    List,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Email address, referenced by import files
    #[arg(long)]
    pub email: String,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run(cmd: UserCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        UserCommands::Add(args) => run_add(args, global),
        UserCommands::List => run_list(global),
    }
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let email = args.email.trim();
    if !email.contains('@') {
        return Err(miette::miette!("'{}' is not an email address", email));
    }

    let user = session
        .store
        .create_user(email, args.name.as_deref())
        .map_err(|e| miette::miette!("Cannot create user '{}': {}", email, e))?;

    let actor = session.config.author();
    session
        .store
        .record_audit(
            &actor,
            "create",
            "user",
            Some(user.id),
            &json!({ "email": user.email }),
        )
        .into_diagnostic()?;

    if session.format(global) == OutputFormat::Json {
        return print_json(&user);
    }
    if !global.quiet {
        println!(
            "{} Created user {} {}",
            style("✓").green(),
            style(&user.email).cyan(),
            style(format!("#{}", user.id)).dim()
        );
    }
    Ok(())
}

fn run_list(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let users = session.store.list_users().into_diagnostic()?;

    let format = session.format(global);
    if format == OutputFormat::Json {
        return print_json(&users);
    }

    let mut table = Table::new(&["ID", "EMAIL", "NAME", "CREATED"]);
    for user in &users {
        table.push(vec![
            user.id.to_string(),
            user.email.clone(),
            opt(&user.name),
            format_date(&user.created_at),
        ]);
    }
    table.print(format, "user", global.quiet);
    Ok(())
}
