//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    audit::AuditCommands, completions::CompletionsArgs, config::ConfigCommands,
    defect::DefectCommands, export::ExportArgs, file::FileCommands, import::ImportArgs,
    init::InitArgs, project::ProjectCommands, test_case::TestCaseCommands, user::UserCommands,
};

#[derive(Parser)]
#[command(name = "qat")]
#[command(author, version, about = "QA Tracker")]
#[command(long_about = "Manage projects, test cases and defects in a local database, with spreadsheet import and export.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Workspace root (default: auto-detect by finding .qat/)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new QAT workspace
    Init(InitArgs),

    /// Project management
    #[command(subcommand)]
    Project(ProjectCommands),

    /// User management
    #[command(subcommand)]
    User(UserCommands),

    /// Test case file and defect file management
    #[command(subcommand)]
    File(FileCommands),

    /// Test case queries
    #[command(subcommand)]
    TestCase(TestCaseCommands),

    /// Defect queries
    #[command(subcommand)]
    Defect(DefectCommands),

    /// Import test cases or defects from a CSV, TSV or JSON file
    Import(ImportArgs),

    /// Export test cases or defects in the import column layout
    Export(ExportArgs),

    /// Audit log
    #[command(subcommand)]
    Audit(AuditCommands),

    /// Configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables and progress lines
    #[default]
    Auto,
    /// JSON format (for programming)
    Json,
    /// Tab-separated values (for piping)
    Tsv,
    /// CSV format (for spreadsheets)
    Csv,
}

impl OutputFormat {
    /// Resolve `auto` against the configured default format
    pub fn resolve(self, configured: Option<&str>) -> Self {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|s| OutputFormat::from_str(s, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }
}
