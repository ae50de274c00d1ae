//! Natural-key upsert
//!
//! Looks up `(project, external code)`; an existing record gets a full-field
//! overwrite, otherwise a new record is inserted. Last write wins per row.

use std::collections::HashSet;

use serde::Serialize;

use super::resolve::ResolvedPayload;
use crate::core::{StoreError, TargetRepository};

/// Whether a row created a record or overwrote one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertMode {
    Created,
    Updated,
}

impl std::fmt::Display for UpsertMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpsertMode::Created => write!(f, "created"),
            UpsertMode::Updated => write!(f, "updated"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub mode: UpsertMode,
    /// Record id; `None` only for a dry-run create
    pub id: Option<i64>,
}

/// Create or update the record keyed by the payload's natural key
///
/// With `dry_run` only the lookup runs and the would-be mode is reported.
pub fn upsert<R: TargetRepository + ?Sized>(
    repo: &mut R,
    payload: &ResolvedPayload,
    dry_run: bool,
) -> Result<UpsertOutcome, StoreError> {
    let existing = match payload {
        ResolvedPayload::TestCase(draft) => {
            repo.find_test_case(draft.project_id, &draft.test_case_id_code)?
        }
        ResolvedPayload::Defect(draft) => repo.find_defect(draft.project_id, &draft.defect_id_code)?,
    };

    if dry_run {
        let mode = if existing.is_some() {
            UpsertMode::Updated
        } else {
            UpsertMode::Created
        };
        return Ok(UpsertOutcome { mode, id: existing });
    }

    let outcome = match (existing, payload) {
        (Some(id), ResolvedPayload::TestCase(draft)) => {
            repo.update_test_case(id, draft)?;
            UpsertOutcome {
                mode: UpsertMode::Updated,
                id: Some(id),
            }
        }
        (Some(id), ResolvedPayload::Defect(draft)) => {
            repo.update_defect(id, draft)?;
            UpsertOutcome {
                mode: UpsertMode::Updated,
                id: Some(id),
            }
        }
        (None, ResolvedPayload::TestCase(draft)) => UpsertOutcome {
            mode: UpsertMode::Created,
            id: Some(repo.create_test_case(draft)?),
        },
        (None, ResolvedPayload::Defect(draft)) => UpsertOutcome {
            mode: UpsertMode::Created,
            id: Some(repo.create_defect(draft)?),
        },
    };

    tracing::trace!(
        kind = %payload.kind(),
        code = payload.code(),
        mode = %outcome.mode,
        "upserted record"
    );
    Ok(outcome)
}

/// Dry-run bookkeeping for one run
///
/// Nothing is inserted during a dry run, so a key repeated later in the same
/// file would otherwise be reported as a second create.
#[derive(Debug, Default)]
pub struct DryRunPlan {
    planned: HashSet<(i64, String)>,
}

impl DryRunPlan {
    /// Report the mode a real run would use for this row
    pub fn upsert<R: TargetRepository + ?Sized>(
        &mut self,
        repo: &mut R,
        payload: &ResolvedPayload,
    ) -> Result<UpsertOutcome, StoreError> {
        let outcome = upsert(repo, payload, true)?;
        if outcome.mode == UpsertMode::Created
            && !self
                .planned
                .insert((payload.project_id(), payload.code().to_string()))
        {
            return Ok(UpsertOutcome {
                mode: UpsertMode::Updated,
                id: None,
            });
        }
        Ok(outcome)
    }
}
