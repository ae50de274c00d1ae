//! Row resolution against the reference index
//!
//! Turns a normalized row into a persistable draft: references become ids,
//! enum text becomes typed values, and cross-field rules are checked.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::columns as col;
use super::index::ReferenceIndex;
use super::normalize::{NormalizedDefect, NormalizedRow, NormalizedTestCase, RowReferences};
use crate::core::entity::{Complexity, DefectStatus, Priority, Severity, TestCaseStatus};
use crate::entities::{DefectDraft, EntityKind, Project, TestCaseDraft};

/// Upper bound for `estimatedMinutes`: one week
pub const MAX_ESTIMATED_MINUTES: i64 = 7 * 24 * 60;

/// A fully resolved row, ready for the upsert executor
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedPayload {
    TestCase(TestCaseDraft),
    Defect(DefectDraft),
}

impl ResolvedPayload {
    pub fn kind(&self) -> EntityKind {
        match self {
            ResolvedPayload::TestCase(_) => EntityKind::TestCase,
            ResolvedPayload::Defect(_) => EntityKind::Defect,
        }
    }

    pub fn project_id(&self) -> i64 {
        match self {
            ResolvedPayload::TestCase(draft) => draft.project_id,
            ResolvedPayload::Defect(draft) => draft.project_id,
        }
    }

    /// External code half of the natural key
    pub fn code(&self) -> &str {
        match self {
            ResolvedPayload::TestCase(draft) => &draft.test_case_id_code,
            ResolvedPayload::Defect(draft) => &draft.defect_id_code,
        }
    }
}

/// Resolve one normalized row; every problem in the row is reported
pub fn resolve(row: NormalizedRow, index: &ReferenceIndex) -> Result<ResolvedPayload, Vec<String>> {
    match row {
        NormalizedRow::TestCase(tc) => resolve_test_case(tc, index).map(ResolvedPayload::TestCase),
        NormalizedRow::Defect(defect) => resolve_defect(defect, index).map(ResolvedPayload::Defect),
    }
}

fn resolve_test_case(
    tc: NormalizedTestCase,
    index: &ReferenceIndex,
) -> Result<TestCaseDraft, Vec<String>> {
    let mut errors = Vec::new();

    let (project_id, file_id) = match resolve_scope(&tc.refs, EntityKind::TestCase, index) {
        Ok(scope) => scope,
        Err(mut e) => {
            errors.append(&mut e);
            (0, None)
        }
    };

    let priority = choice::<Priority>(col::PRIORITY, tc.priority, Priority::all(), &mut errors);
    let severity = choice::<Severity>(col::SEVERITY, tc.severity, Severity::all(), &mut errors);
    let complexity =
        choice::<Complexity>(col::COMPLEXITY, tc.complexity, Complexity::all(), &mut errors);
    let status = choice::<TestCaseStatus>(col::STATUS, tc.status, TestCaseStatus::all(), &mut errors);

    if let Some(minutes) = tc.estimated_minutes {
        if !(0..=MAX_ESTIMATED_MINUTES).contains(&minutes) {
            errors.push(format!(
                "{} must be between 0 and {}",
                col::ESTIMATED_MINUTES,
                MAX_ESTIMATED_MINUTES
            ));
        }
    }

    let author_id = resolve_user(col::AUTHOR, tc.author.as_deref(), index);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(TestCaseDraft {
        project_id,
        test_case_id_code: tc.code,
        title: tc.title,
        description: tc.description,
        module: tc.module,
        preconditions: tc.preconditions,
        steps: tc.steps,
        expected_result: tc.expected_result,
        priority,
        severity,
        complexity,
        status,
        estimated_minutes: tc.estimated_minutes,
        test_data: tc.test_data,
        file_id,
        author_id,
        created_date: tc.created_date,
    })
}

fn resolve_defect(
    defect: NormalizedDefect,
    index: &ReferenceIndex,
) -> Result<DefectDraft, Vec<String>> {
    let mut errors = Vec::new();

    let (project_id, file_id) = match resolve_scope(&defect.refs, EntityKind::Defect, index) {
        Ok(scope) => scope,
        Err(mut e) => {
            errors.append(&mut e);
            (0, None)
        }
    };

    let severity = choice::<Severity>(col::SEVERITY, defect.severity, Severity::all(), &mut errors);
    let priority = choice::<Priority>(col::PRIORITY, defect.priority, Priority::all(), &mut errors);
    let status = choice::<DefectStatus>(col::STATUS, defect.status, DefectStatus::all(), &mut errors);

    check_not_before(col::DUE_DATE, defect.due_date, defect.reported_date, &mut errors);
    check_not_before(
        col::RESOLVED_DATE,
        defect.resolved_date,
        defect.reported_date,
        &mut errors,
    );

    let assigned_to_id = resolve_user(col::ASSIGNED_TO, defect.assigned_to.as_deref(), index);
    let reported_by_id = resolve_user(col::REPORTED_BY, defect.reported_by.as_deref(), index);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(DefectDraft {
        project_id,
        defect_id_code: defect.code,
        title: defect.title,
        description: defect.description,
        module: defect.module,
        steps_to_reproduce: defect.steps_to_reproduce,
        expected_result: defect.expected_result,
        actual_result: defect.actual_result,
        environment: defect.environment,
        severity,
        priority,
        status,
        test_case_id_code: defect.test_case_id_code,
        input_data: defect.input_data,
        file_id,
        assigned_to_id,
        reported_by_id,
        reported_date: defect.reported_date,
        due_date: defect.due_date,
        resolved_date: defect.resolved_date,
    })
}

/// Resolve the project and the optional parent file inside it
fn resolve_scope(
    refs: &RowReferences,
    kind: EntityKind,
    index: &ReferenceIndex,
) -> Result<(i64, Option<i64>), Vec<String>> {
    let Some(reference) = refs.project.as_deref() else {
        return Err(vec![format!(
            "{}, {} or {} is required",
            col::PROJECT_ID,
            col::PROJECT_CODE,
            col::PROJECT_NAME
        )]);
    };

    let Some(project) = index.project(reference) else {
        return Err(vec![format!("Invalid project reference '{}'", reference)]);
    };

    let file_id = resolve_file(refs, kind, project, index).map_err(|e| vec![e])?;
    Ok((project.id, file_id))
}

/// An id takes precedence over a name; both blank means unlinked
fn resolve_file(
    refs: &RowReferences,
    kind: EntityKind,
    project: &Project,
    index: &ReferenceIndex,
) -> Result<Option<i64>, String> {
    let label = kind.file_label();

    if let Some(raw_id) = refs.file_id.as_deref() {
        let id: i64 = raw_id
            .parse()
            .map_err(|_| format!("Invalid {} id '{}'", label.to_lowercase(), raw_id))?;

        let file = index
            .file_by_id(id)
            .ok_or_else(|| format!("{} {} not found", label, id))?;

        if file.project_id != project.id {
            let owner = index
                .project_by_id(file.project_id)
                .map(|p| p.code.as_str())
                .unwrap_or("unknown");
            return Err(format!(
                "{} {} belongs to project '{}', not '{}'",
                label, id, owner, project.code
            ));
        }
        return Ok(Some(file.id));
    }

    if let Some(name) = refs.file_name.as_deref() {
        let file = index.file_by_name(project.id, name).ok_or_else(|| {
            format!("{} '{}' not found in project '{}'", label, name, project.code)
        })?;
        return Ok(Some(file.id));
    }

    Ok(None)
}

/// Users are optional links; an unknown reference is dropped with a warning
fn resolve_user(column: &str, reference: Option<&str>, index: &ReferenceIndex) -> Option<i64> {
    let reference = reference?;
    match index.user(reference) {
        Some(user) => Some(user.id),
        None => {
            tracing::warn!(column, reference, "user reference not found, leaving unset");
            None
        }
    }
}

fn choice<T>(field: &str, value: Option<String>, allowed: &[T], errors: &mut Vec<String>) -> Option<T>
where
    T: FromStr + Display,
{
    let value = value?;
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            let expected: Vec<String> = allowed.iter().map(|v| v.to_string()).collect();
            errors.push(format!(
                "Invalid {} '{}'. Expected one of: {}",
                field,
                value,
                expected.join(", ")
            ));
            None
        }
    }
}

fn check_not_before(
    field: &str,
    date: Option<DateTime<Utc>>,
    reported: Option<DateTime<Utc>>,
    errors: &mut Vec<String>,
) {
    if let (Some(date), Some(reported)) = (date, reported) {
        if date < reported {
            errors.push(format!(
                "{} must not be before {}",
                field,
                col::REPORTED_DATE
            ));
        }
    }
}
