//! `qat init` command - Initialize a new QAT workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::{Config, Store, Workspace, WorkspaceError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the workspace config even if .qat/ already exists (the database is kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    match Workspace::init(&path, args.force) {
        Ok(workspace) => {
            let config = Config::load(Some(&workspace));
            let db_path = workspace.database_path(config.database.as_deref());
            Store::open(&db_path).into_diagnostic()?;

            println!(
                "{} Initialized QAT workspace at {}",
                style("✓").green(),
                style(workspace.root().display()).cyan()
            );
            println!("  Database: {}", style(db_path.display()).dim());
            println!();
            println!("Next steps:");
            println!(
                "  {} Create a project",
                style("qat project add --code WEB --name Website").yellow()
            );
            println!(
                "  {} Get an import template",
                style("qat import test-case --template > cases.csv").yellow()
            );
            println!(
                "  {} Import it",
                style("qat import test-case cases.csv").yellow()
            );
            Ok(())
        }
        Err(WorkspaceError::AlreadyExists(path)) => {
            println!(
                "{} QAT workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("qat init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
