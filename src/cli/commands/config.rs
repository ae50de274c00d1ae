//! `qat config` command - Configuration inspection

use clap::Subcommand;
use console::style;
use miette::Result;
use serde_json::json;

use crate::cli::helpers::{print_json, Session};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration values
    Show,

    /// Show paths to configuration files and the database
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(global),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let config = &session.config;
    let author = config.author();
    let database = session
        .workspace
        .database_path(config.database.as_deref());

    if session.format(global) == OutputFormat::Json {
        return print_json(&json!({
            "author": author,
            "database": database.display().to_string(),
            "default_format": config.default_format,
        }));
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();
    print_config_value("author", Some(&author));
    print_config_value("database", Some(&database.display().to_string()));
    print_config_value("default_format", config.default_format.as_deref());

    if !global.quiet {
        println!();
        println!("{}", style("Config Sources (in priority order):").dim());
        println!("  1. Environment variables (QAT_AUTHOR, QAT_DATABASE)");
        println!("  2. Workspace config (.qat/config.yaml)");
        println!("  3. Global config (~/.config/qat/config.yaml)");
    }
    Ok(())
}

fn run_path(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let workspace_path = session.workspace.qat_dir().join("config.yaml");
    let database = session
        .workspace
        .database_path(session.config.database.as_deref());

    println!("{}", style("Configuration file paths:").bold());
    println!();
    if let Some(global_path) = Config::global_config_path() {
        print_path("Global:   ", &global_path);
    }
    print_path("Workspace:", &workspace_path);
    print_path("Database: ", &database);
    Ok(())
}

fn print_path(label: &str, path: &std::path::Path) {
    let state = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("  {} {} {}", style(label).cyan(), path.display(), state);
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}
