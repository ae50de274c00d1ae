//! `qat export` command - Export records in the import column layout

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::cli::helpers::Session;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::TargetFilter;
use crate::entities::EntityKind;
use crate::export::ExportTable;
use crate::import::ReferenceIndex;

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Record kind to export
    #[arg(value_enum)]
    pub kind: EntityKind,

    /// Only records of this project (id, code or name)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Write to a file instead of stdout (.csv, .tsv or .xlsx)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let project_id = match &args.project {
        Some(reference) => Some(session.project(reference)?.id),
        None => None,
    };
    let filter = TargetFilter {
        project_id,
        ..Default::default()
    };

    let index = ReferenceIndex::build(&session.store, args.kind).into_diagnostic()?;
    let table = match args.kind {
        EntityKind::TestCase => {
            let records = session.store.list_test_cases(&filter).into_diagnostic()?;
            ExportTable::test_cases(&records, &index)
        }
        EntityKind::Defect => {
            let records = session.store.list_defects(&filter).into_diagnostic()?;
            ExportTable::defects(&records, &index)
        }
    };

    let Some(path) = args.output else {
        let delimiter = if session.format(global) == OutputFormat::Tsv {
            b'\t'
        } else {
            b','
        };
        return table
            .write_delimited(io::stdout().lock(), delimiter)
            .into_diagnostic();
    };

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" => {
            let sheet_name = match args.kind {
                EntityKind::TestCase => "Test Cases",
                EntityKind::Defect => "Defects",
            };
            let bytes = table.to_xlsx(sheet_name).into_diagnostic()?;
            fs::write(&path, bytes).into_diagnostic()?;
        }
        "tsv" => {
            let file = fs::File::create(&path).into_diagnostic()?;
            table.write_delimited(file, b'\t').into_diagnostic()?;
        }
        _ => {
            let file = fs::File::create(&path).into_diagnostic()?;
            table.write_delimited(file, b',').into_diagnostic()?;
        }
    }

    if !global.quiet {
        eprintln!(
            "{} Exported {} {} to {}",
            style("✓").green(),
            style(table.rows.len()).cyan(),
            args.kind.plural(),
            style(path.display()).yellow()
        );
    }
    Ok(())
}
