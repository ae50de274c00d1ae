//! `qat test-case` command - Test case queries

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{opt, print_json, truncate_str, Session};
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{TargetFilter, TestCaseStatus};
use crate::entities::EntityKind;
use crate::import::ReferenceIndex;

#[derive(Subcommand, Debug)]
pub enum TestCaseCommands {
    /// List test cases
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only test cases of this project (id, code or name)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Only test cases in this status (draft, ready, active, deprecated)
    #[arg(long, short = 's')]
    pub status: Option<TestCaseStatus>,

    /// Show at most this many
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

pub fn run(cmd: TestCaseCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TestCaseCommands::List(args) => run_list(args, global),
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
        limit: args.limit,
        ..Default::default()
    };
    let test_cases = session.store.list_test_cases(&filter).into_diagnostic()?;

    let format = session.format(global);
    if format == OutputFormat::Json {
        return print_json(&test_cases);
    }

    let index = ReferenceIndex::build(&session.store, EntityKind::TestCase).into_diagnostic()?;
    let mut table = Table::new(&[
        "ID", "PROJECT", "CODE", "TITLE", "PRIORITY", "STATUS", "FILE",
    ]);
    for tc in &test_cases {
        let f = &tc.fields;
        table.push(vec![
            tc.id.to_string(),
            index
                .project_by_id(f.project_id)
                .map(|p| p.code.clone())
                .unwrap_or_default(),
            f.test_case_id_code.clone(),
            truncate_str(&f.title, 40),
            opt(&f.priority),
            opt(&f.status),
            f.file_id
                .and_then(|id| index.file_by_id(id))
                .map(|file| file.name.clone())
                .unwrap_or_default(),
        ]);
    }
    table.print(format, "test case", global.quiet);
    Ok(())
}
