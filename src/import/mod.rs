//! Bulk tabular import
//!
//! Reconciles a parsed sheet against the database, one row at a time:
//!
//! 1. [`index::ReferenceIndex`] is built once per run
//! 2. [`normalize::normalize`] types the raw cells
//! 3. [`resolve::resolve`] turns references into ids and validates
//! 4. [`upsert::upsert`] creates or updates by `(project, code)`
//!
//! Rows never affect each other: a failing row is recorded in the summary
//! and the run moves on. Only a failure to build the reference index
//! aborts the whole run, before anything has been written.

pub mod columns;
pub mod index;
pub mod normalize;
pub mod resolve;
pub mod sheet;
pub mod upsert;

pub use index::ReferenceIndex;
pub use resolve::ResolvedPayload;
pub use sheet::{parse_sheet, Cell, ParsedSheet, SheetFormat, SheetRow};
pub use upsert::{DryRunPlan, UpsertMode, UpsertOutcome};

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::core::{ReferenceSource, StoreError, TargetRepository};
use crate::entities::EntityKind;

/// Options for one import run
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Resolve and look up every row but write nothing
    pub dry_run: bool,
}

/// A successfully imported row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedRow {
    pub row: usize,
    pub mode: UpsertMode,
    pub id: Option<i64>,
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedRow {
    pub row: usize,
    pub errors: Vec<String>,
}

/// Outcome of one row, as reported to the progress callback
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Succeeded(CreatedRow),
    Failed(FailedRow),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    /// Successful rows, whether created or updated
    pub created: usize,
    pub failed: usize,
}

/// Result of a whole import run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub summary: SummaryCounts,
    pub created: Vec<CreatedRow>,
    pub failed: Vec<FailedRow>,
    pub parse_errors: Vec<String>,
}

impl ImportSummary {
    /// Rows that created a new record
    pub fn new_records(&self) -> usize {
        self.created
            .iter()
            .filter(|c| c.mode == UpsertMode::Created)
            .count()
    }

    /// Rows that overwrote an existing record
    pub fn updated_records(&self) -> usize {
        self.created
            .iter()
            .filter(|c| c.mode == UpsertMode::Updated)
            .count()
    }

    /// The response envelope: `{"success": true, "data": {...}}`
    pub fn to_response(&self) -> Value {
        json!({
            "success": true,
            "data": self,
        })
    }

    fn push(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Succeeded(row) => {
                self.summary.created += 1;
                self.created.push(row);
            }
            RowOutcome::Failed(row) => {
                self.summary.failed += 1;
                self.failed.push(row);
            }
        }
    }
}

/// Errors that abort a whole import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to load reference data: {0}")]
    ReferenceIndex(#[source] StoreError),
}

/// Import every row of `sheet` as `kind` records
///
/// `progress` is called once per row, in file order, as soon as the row's
/// outcome is known.
pub fn run_import<S, F>(
    store: &mut S,
    sheet: &ParsedSheet,
    kind: EntityKind,
    options: &ImportOptions,
    mut progress: F,
) -> Result<ImportSummary, ImportError>
where
    S: ReferenceSource + TargetRepository + ?Sized,
    F: FnMut(&RowOutcome),
{
    let index = ReferenceIndex::build(&*store, kind).map_err(ImportError::ReferenceIndex)?;

    let mut summary = ImportSummary {
        parse_errors: sheet.errors.clone(),
        ..Default::default()
    };

    let mut plan = options.dry_run.then(DryRunPlan::default);
    for raw in &sheet.rows {
        let outcome = import_row(store, &index, kind, raw, plan.as_mut());
        match &outcome {
            RowOutcome::Succeeded(ok) => {
                tracing::debug!(row = ok.row, mode = %ok.mode, id = ?ok.id, "row imported")
            }
            RowOutcome::Failed(failed) => {
                tracing::debug!(row = failed.row, errors = ?failed.errors, "row failed")
            }
        }
        progress(&outcome);
        summary.push(outcome);
    }

    tracing::info!(
        kind = %kind,
        created = summary.summary.created,
        failed = summary.summary.failed,
        dry_run = options.dry_run,
        "import finished"
    );
    Ok(summary)
}

fn import_row<S>(
    store: &mut S,
    index: &ReferenceIndex,
    kind: EntityKind,
    raw: &SheetRow,
    plan: Option<&mut DryRunPlan>,
) -> RowOutcome
where
    S: TargetRepository + ?Sized,
{
    let failed = |errors: Vec<String>| {
        RowOutcome::Failed(FailedRow {
            row: raw.row,
            errors,
        })
    };

    let payload = match normalize::normalize(kind, raw).and_then(|row| resolve::resolve(row, index))
    {
        Ok(payload) => payload,
        Err(errors) => return failed(errors),
    };

    let outcome = match plan {
        Some(plan) => plan.upsert(store, &payload),
        None => upsert::upsert(store, &payload, false),
    };
    match outcome {
        Ok(outcome) => RowOutcome::Succeeded(CreatedRow {
            row: raw.row,
            mode: outcome.mode,
            id: outcome.id,
        }),
        Err(e) => failed(vec![e.to_string()]),
    }
}
